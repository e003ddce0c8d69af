//! Shared HTTP response helpers for the ESI client.
//!
//! Centralizes status-code checks so the client module stays focused on
//! request construction and response mapping.

use crate::error::EsiError;

/// Check an HTTP response for error status codes.
///
/// Returns the response unchanged on success; any non-success status maps to
/// [`EsiError::Api`] with the response body as the message. Retryability is
/// decided later from the status code, not here.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, EsiError> {
    if !resp.status().is_success() {
        return Err(EsiError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Read the `X-Pages` pagination header, defaulting to a single page.
pub fn page_count(resp: &reqwest::Response) -> u32 {
    resp.headers()
        .get("x-pages")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(1)
}
