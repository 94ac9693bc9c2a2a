use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::archive::ARCHIVE_FILENAME;
use crate::error::{Result, SdkError};
use crate::transport::{FormPart, HttpResponse, HttpTransport, ReqwestTransport};
use crate::types::{ClaimPayload, Task};

pub const TASK_PATH: &str = "/api/v1/task";
pub const SUBMIT_PATH: &str = "/api/v1/submit";
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// HTTP client for the coordinator ("notary") API. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct NotaryClient<T = ReqwestTransport> {
    base_url: String,
    transport: T,
}

impl NotaryClient<ReqwestTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, ReqwestTransport::new())
    }
}

impl<T: HttpTransport> NotaryClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn fetch_task(&self) -> Result<Task> {
        let url = self.url(TASK_PATH);
        debug!(%url, "fetching task");
        let resp = self.transport.get(&url).await?;
        let task = decode_object(&url, resp)?;
        info!(fields = task.len(), "fetched task");
        Ok(task)
    }

    /// Posts the claim as multipart `payload` + `artifact`, with the signature
    /// in the `X-Signature` header. The `payload` part is plain JSON; only the
    /// signature is computed over the canonical form.
    pub async fn submit_claim(
        &self,
        payload: &ClaimPayload,
        signature_hex: &str,
        artifact: Vec<u8>,
    ) -> Result<Map<String, Value>> {
        let url = self.url(SUBMIT_PATH);
        let payload_json = serde_json::to_vec(payload)?;
        debug!(
            %url,
            task_id = %payload.task_id,
            artifact_len = artifact.len(),
            "submitting claim"
        );

        let parts = vec![
            FormPart::new("payload", "application/json", payload_json),
            FormPart::new("artifact", "application/gzip", artifact).with_filename(ARCHIVE_FILENAME),
        ];
        let headers = vec![(SIGNATURE_HEADER.to_string(), signature_hex.to_string())];

        let resp = self.transport.post_multipart(&url, &headers, parts).await?;
        let body = decode_object(&url, resp)?;
        info!(task_id = %payload.task_id, "claim submitted");
        Ok(body)
    }
}

fn decode_object(url: &str, resp: HttpResponse) -> Result<Map<String, Value>> {
    if !resp.is_success() {
        let body = resp.body_text();
        warn!(%url, status = resp.status, "coordinator returned error status");
        return Err(SdkError::Remote { status: resp.status, body });
    }
    serde_json::from_slice(&resp.body).map_err(SdkError::InvalidResponse)
}
