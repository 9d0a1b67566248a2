use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::Result;
use crate::models::ObservationRecord;
use crate::utils::constants::{
    DEFAULT_COLLECTION_DESCRIPTION, DEFAULT_COLLECTION_NAME, DEFAULT_COLLECTION_TAGS,
    DOWNLOAD_TIMEOUT_SECS, SCHEMA_PREVIEW_FIELDS, UPLOAD_TIMEOUT_SECS,
};

const API_KEY_HEADER: &str = "X-API-Key";

/// Result of a batch upload. Anything other than HTTP 200 is a soft failure:
/// reported to the caller, never raised as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Success { records_sent: usize },
    Failure { status: u16, body: String },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }
}

/// Result of the one-time collection registration call.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    Created { status: u16, descriptor: Value },
    Rejected { status: u16, body: String },
}

/// Descriptive fields for a new collection.
#[derive(Debug, Clone)]
pub struct CollectionSpec {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl Default for CollectionSpec {
    fn default() -> Self {
        Self {
            name: DEFAULT_COLLECTION_NAME.to_string(),
            description: DEFAULT_COLLECTION_DESCRIPTION.to_string(),
            tags: DEFAULT_COLLECTION_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Client for the time-series ingestion API.
pub struct IngestClient {
    base_url: String,
    project_id: String,
    send_timeout: Duration,
    admin_timeout: Duration,
    accept_invalid_certs: bool,
}

impl IngestClient {
    pub fn new(base_url: &str, project_id: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            send_timeout: Duration::from_secs(UPLOAD_TIMEOUT_SECS),
            admin_timeout: Duration::from_secs(DOWNLOAD_TIMEOUT_SECS),
            accept_invalid_certs: false,
        }
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// POST the full record batch as one JSON array.
    ///
    /// HTTP 200 is the only success status. Other statuses come back as
    /// `UploadOutcome::Failure` with the response body; only transport-level
    /// problems (connect failure, timeout) are an `Err`.
    pub fn send_batch(
        &self,
        collection_id: &str,
        write_key: &str,
        records: &[ObservationRecord],
    ) -> Result<UploadOutcome> {
        let url = self.send_data_url(collection_id);
        debug!(url = %url, records = records.len(), "uploading batch");

        let response = self
            .client(self.send_timeout)?
            .post(&url)
            .header(API_KEY_HEADER, write_key)
            .json(records)
            .send()?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(UploadOutcome::Success {
                records_sent: records.len(),
            })
        } else {
            let body = response.text().unwrap_or_default();
            Ok(UploadOutcome::Failure {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// One-time administrative call registering the collection, with a
    /// schema preview derived from a sample record.
    pub fn create_collection(
        &self,
        master_key: &str,
        spec: &CollectionSpec,
        example: &ObservationRecord,
    ) -> Result<RegistrationOutcome> {
        let url = self.collections_url();
        let payload = registration_payload(spec, example);
        debug!(url = %url, name = %spec.name, "registering collection");

        let response = self
            .client(self.admin_timeout)?
            .post(&url)
            .header(API_KEY_HEADER, master_key)
            .json(&payload)
            .send()?;

        let status = response.status();
        if status.is_success() {
            let descriptor: Value = response.json()?;
            Ok(RegistrationOutcome::Created {
                status: status.as_u16(),
                descriptor,
            })
        } else {
            let body = response.text().unwrap_or_default();
            Ok(RegistrationOutcome::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    fn client(&self, timeout: Duration) -> Result<Client> {
        Ok(Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()?)
    }

    fn send_data_url(&self, collection_id: &str) -> String {
        format!(
            "{}/projects/{}/collections/{}/send_data",
            self.base_url, self.project_id, collection_id
        )
    }

    fn collections_url(&self) -> String {
        format!("{}/projects/{}/collections", self.base_url, self.project_id)
    }
}

fn registration_payload(spec: &CollectionSpec, example: &ObservationRecord) -> Value {
    json!({
        "name": spec.name,
        "description": spec.description,
        "tags": spec.tags,
        "collection_schema": example.schema_preview(SCHEMA_PREVIEW_FIELDS),
    })
}
