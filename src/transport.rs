use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::error::{Result, SdkError};

/// Status and raw body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub(crate) fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One part of a multipart/form-data body.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl FormPart {
    pub fn new(name: &str, content_type: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            filename: None,
            content_type: content_type.to_string(),
            data,
        }
    }

    pub fn with_filename(mut self, filename: &str) -> Self {
        self.filename = Some(filename.to_string());
        self
    }
}

/// The HTTP capability the client needs. Network failures are reported as
/// `SdkError::Transport`; any response that arrives, whatever its status, is Ok.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;

    async fn post_multipart(
        &self,
        url: &str,
        headers: &[(String, String)],
        parts: Vec<FormPart>,
    ) -> Result<HttpResponse>;
}

/// `reqwest`-backed transport with the client's default timeouts.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }

    async fn post_multipart(
        &self,
        url: &str,
        headers: &[(String, String)],
        parts: Vec<FormPart>,
    ) -> Result<HttpResponse> {
        let mut form = Form::new();
        for p in parts {
            let mut part = Part::bytes(p.data)
                .mime_str(&p.content_type)
                .map_err(|e| SdkError::Serialization(format!("content type {}: {}", p.content_type, e)))?;
            if let Some(filename) = p.filename {
                part = part.file_name(filename);
            }
            form = form.part(p.name, part);
        }

        let mut req = self.client.post(url).multipart(form);
        for (name, value) in headers {
            req = req.header(name.as_str(), value.as_str());
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}
