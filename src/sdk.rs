use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::archive;
use crate::client::NotaryClient;
use crate::config::SdkConfig;
use crate::error::Result;
use crate::signing::ClaimSigner;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{ClaimPayload, Task};

pub const DEFAULT_NOTARY_URL: &str = "http://localhost:3000";

/// Miner-side facade: fetch tasks, package artifacts, sign and submit claims.
///
/// Holds only the signing identity and the coordinator client; both are
/// read-only after construction, so one instance can serve concurrent calls.
#[derive(Debug)]
pub struct MinerSdk<T = ReqwestTransport> {
    signer: ClaimSigner,
    client: NotaryClient<T>,
}

impl MinerSdk<ReqwestTransport> {
    pub fn new(private_key_hex: &str, notary_url: &str) -> Result<Self> {
        Self::with_transport(private_key_hex, notary_url, ReqwestTransport::new())
    }

    pub fn from_config(config: &SdkConfig) -> Result<Self> {
        Self::new(&config.signing_key_hex, &config.notary_url)
    }
}

impl<T: HttpTransport> MinerSdk<T> {
    pub fn with_transport(private_key_hex: &str, notary_url: &str, transport: T) -> Result<Self> {
        let signer = ClaimSigner::from_hex(private_key_hex)?;
        debug!(public_key = %signer.public_key_hex(), %notary_url, "miner sdk ready");
        Ok(Self {
            signer,
            client: NotaryClient::with_transport(notary_url, transport),
        })
    }

    pub fn notary_url(&self) -> &str {
        self.client.base_url()
    }

    pub fn public_key_hex(&self) -> String {
        self.signer.public_key_hex()
    }

    pub fn client(&self) -> &NotaryClient<T> {
        &self.client
    }

    pub async fn fetch_task(&self) -> Result<Task> {
        self.client.fetch_task().await
    }

    pub fn create_package<H: Serialize + ?Sized>(&self, hyperparameters: &H, wasm: &[u8]) -> Result<Vec<u8>> {
        archive::build(hyperparameters, wasm)
    }

    pub fn sign_payload(&self, payload: &ClaimPayload) -> Result<String> {
        self.signer.sign_claim(payload)
    }

    /// Signs `payload` and submits it with an already-built archive.
    pub async fn submit_claim(&self, payload: &ClaimPayload, artifact: Vec<u8>) -> Result<Map<String, Value>> {
        let signature = self.sign_payload(payload)?;
        self.client.submit_claim(payload, &signature, artifact).await
    }

    /// Full submission: sign, build the archive, submit. Nothing is kept
    /// between steps; on failure the caller starts over.
    pub async fn submit_package<H: Serialize + ?Sized>(
        &self,
        payload: &ClaimPayload,
        hyperparameters: &H,
        wasm: &[u8],
    ) -> Result<Map<String, Value>> {
        let signature = self.sign_payload(payload)?;
        let artifact = archive::build(hyperparameters, wasm)?;
        self.client.submit_claim(payload, &signature, artifact).await
    }
}
