//! Gateway error types.

use thiserror::Error;

/// Errors that can occur when talking to the ESI contacts API.
#[derive(Debug, Error)]
pub enum EsiError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// ESI returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by ESI.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// A write call was accepted but the remote reported fewer ids than
    /// requested.
    #[error("remote accepted an incomplete write; missing ids: {missing:?}")]
    IncompleteWrite {
        /// Requested ids absent from the accepted set.
        missing: Vec<u32>,
    },

    /// Failed to parse an ESI response.
    #[error("parse error: {0}")]
    Parse(String),
}

impl EsiError {
    /// Whether the retry loop may re-attempt after this error.
    ///
    /// Rate limiting (429) and server errors (5xx) are transient, as are
    /// transport-level timeouts and connection failures. Every other 4xx is
    /// permanent and propagates immediately.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::IncompleteWrite { .. } | Self::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(429, true)]
    #[case(500, true)]
    #[case(502, true)]
    #[case(503, true)]
    #[case(504, true)]
    #[case(400, false)]
    #[case(403, false)]
    #[case(404, false)]
    #[case(420, false)]
    fn api_status_retryability(#[case] status: u16, #[case] retryable: bool) {
        let err = EsiError::Api {
            status,
            message: String::new(),
        };
        assert_eq!(err.is_retryable(), retryable);
    }

    #[test]
    fn incomplete_write_is_not_retryable() {
        let err = EsiError::IncompleteWrite { missing: vec![1] };
        assert!(!err.is_retryable());
    }
}
