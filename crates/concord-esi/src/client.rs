//! The production ESI contacts client.
//!
//! Endpoint shapes follow the ESI character contacts API: reads paginate via
//! the `X-Pages` header; writes take `standing` and `label_ids` as query
//! parameters with the target ids as the JSON body; deletes take the ids as
//! a query parameter. Every call runs under the retry policy.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use concord_config::{EsiSettings, RetrySettings};
use concord_core::{Contact, ContactBatch, ContactRecord, LabelRecord, batch_contacts};

use crate::error::EsiError;
use crate::gateway::{ContactsGateway, Credential};
use crate::http::{check_response, page_count};
use crate::retry::{RetryPolicy, retry_call};

enum WriteMethod {
    Post,
    Put,
}

impl WriteMethod {
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "add_contacts",
            Self::Put => "update_contacts",
        }
    }
}

/// HTTP client for the ESI contacts endpoints.
pub struct EsiClient {
    http: reqwest::Client,
    base_url: String,
    max_write_batch: usize,
    max_delete_batch: usize,
    retry: RetryPolicy,
}

impl EsiClient {
    /// Create a client from settings.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(esi: &EsiSettings, retry: &RetrySettings) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(esi.user_agent.clone())
                .timeout(std::time::Duration::from_secs(esi.timeout_seconds))
                .build()
                .expect("reqwest client should build"),
            base_url: esi.base_url.trim_end_matches('/').to_owned(),
            max_write_batch: esi.max_write_batch,
            max_delete_batch: esi.max_delete_batch,
            retry: RetryPolicy::from(retry),
        }
    }

    fn contacts_url(&self, character_id: u32) -> String {
        format!("{}/characters/{character_id}/contacts/", self.base_url)
    }

    fn labels_url(&self, character_id: u32) -> String {
        format!(
            "{}/characters/{character_id}/contacts/labels/",
            self.base_url
        )
    }

    /// Fetch one page of contacts, returning the records and the total page
    /// count from the `X-Pages` header.
    async fn fetch_contacts_page(
        &self,
        credential: &Credential,
        page: u32,
    ) -> Result<(Vec<ContactRecord>, u32), EsiError> {
        let resp = self
            .http
            .get(self.contacts_url(credential.character_id))
            .bearer_auth(&credential.access_token)
            .query(&[("page", page)])
            .send()
            .await?;
        let resp = check_response(resp).await?;
        let pages = page_count(&resp);
        let records = resp.json::<Vec<ContactRecord>>().await?;
        Ok((records, pages))
    }

    /// Issue one batched write call and verify the accepted ids.
    ///
    /// ESI answers a POST with the list of created ids; a PUT answers 204
    /// with no body, which counts as all-accepted. When a body with ids is
    /// present, the accepted set must equal the requested set.
    async fn write_batch(
        &self,
        credential: &Credential,
        batch: &ContactBatch,
        method: &WriteMethod,
    ) -> Result<(), EsiError> {
        let url = self.contacts_url(credential.character_id);
        let mut request = match method {
            WriteMethod::Post => self.http.post(&url),
            WriteMethod::Put => self.http.put(&url),
        }
        .bearer_auth(&credential.access_token)
        .query(&[("standing", batch.standing.to_string())])
        .json(&batch.contact_ids);
        if !batch.label_ids.is_empty() {
            let label_ids: Vec<String> =
                batch.label_ids.iter().map(ToString::to_string).collect();
            request = request.query(&[("label_ids", label_ids.join(","))]);
        }

        let resp = check_response(request.send().await?).await?;
        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(());
        }

        let accepted: Vec<u32> = serde_json::from_str(&body)
            .map_err(|err| EsiError::Parse(format!("write response: {err}")))?;
        let missing: Vec<u32> = batch
            .contact_ids
            .iter()
            .filter(|id| !accepted.contains(id))
            .copied()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            warn!(
                character = %credential.character_name,
                ?missing,
                "remote did not accept all requested contact ids"
            );
            Err(EsiError::IncompleteWrite { missing })
        }
    }

    /// Group, batch, and write contacts with the given method.
    async fn write_contacts(
        &self,
        credential: &Credential,
        contacts: &[Contact],
        method: WriteMethod,
    ) -> Result<(), EsiError> {
        for batch in batch_contacts(contacts, self.max_write_batch) {
            retry_call(self.retry, method.as_str(), || {
                self.write_batch(credential, &batch, &method)
            })
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ContactsGateway for EsiClient {
    async fn fetch_contacts(&self, credential: &Credential) -> Result<Vec<ContactRecord>, EsiError> {
        let (mut records, pages) = retry_call(self.retry, "fetch_contacts", || {
            self.fetch_contacts_page(credential, 1)
        })
        .await?;
        for page in 2..=pages {
            let (mut page_records, _) = retry_call(self.retry, "fetch_contacts", || {
                self.fetch_contacts_page(credential, page)
            })
            .await?;
            records.append(&mut page_records);
        }
        info!(
            character = %credential.character_name,
            count = records.len(),
            "fetched current contacts"
        );
        Ok(records)
    }

    async fn fetch_labels(&self, credential: &Credential) -> Result<Vec<LabelRecord>, EsiError> {
        let records = retry_call(self.retry, "fetch_labels", || async {
            let resp = self
                .http
                .get(self.labels_url(credential.character_id))
                .bearer_auth(&credential.access_token)
                .send()
                .await?;
            let resp = check_response(resp).await?;
            Ok(resp.json::<Vec<LabelRecord>>().await?)
        })
        .await?;
        info!(
            character = %credential.character_name,
            count = records.len(),
            "fetched current labels"
        );
        Ok(records)
    }

    async fn delete_contacts(
        &self,
        credential: &Credential,
        contact_ids: &[u32],
    ) -> Result<(), EsiError> {
        let mut sorted: Vec<u32> = contact_ids.to_vec();
        sorted.sort_unstable();
        for chunk in sorted.chunks(self.max_delete_batch.max(1)) {
            let ids: Vec<String> = chunk.iter().map(ToString::to_string).collect();
            retry_call(self.retry, "delete_contacts", || async {
                let resp = self
                    .http
                    .delete(self.contacts_url(credential.character_id))
                    .bearer_auth(&credential.access_token)
                    .query(&[("contact_ids", ids.join(","))])
                    .send()
                    .await?;
                check_response(resp).await?;
                Ok(())
            })
            .await?;
            debug!(
                character = %credential.character_name,
                count = chunk.len(),
                "deleted contact batch"
            );
        }
        info!(
            character = %credential.character_name,
            count = sorted.len(),
            "deleted contacts"
        );
        Ok(())
    }

    async fn add_contacts(
        &self,
        credential: &Credential,
        contacts: &[Contact],
    ) -> Result<(), EsiError> {
        self.write_contacts(credential, contacts, WriteMethod::Post)
            .await?;
        info!(
            character = %credential.character_name,
            count = contacts.len(),
            "added contacts"
        );
        Ok(())
    }

    async fn update_contacts(
        &self,
        credential: &Credential,
        contacts: &[Contact],
    ) -> Result<(), EsiError> {
        self.write_contacts(credential, contacts, WriteMethod::Put)
            .await?;
        info!(
            character = %credential.character_name,
            count = contacts.len(),
            "updated contacts"
        );
        Ok(())
    }
}
