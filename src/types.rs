use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Task description as returned by the coordinator. Not interpreted here.
pub type Task = Map<String, Value>;

/// Caller-supplied hyperparameters, written verbatim into the package.
pub type Hyperparameters = Map<String, Value>;

/// The fields a miner signs and submits for one claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimPayload {
    pub miner_id: String,
    pub task_id: String,
    pub claimed_score: f64,
    pub artifact_hash: String,
    pub timestamp: String,
    pub nonce: String,
}

impl ClaimPayload {
    /// Builds a payload stamped with the current UTC time and a fresh random nonce.
    pub fn new(
        miner_id: impl Into<String>,
        task_id: impl Into<String>,
        claimed_score: f64,
        artifact_hash: impl Into<String>,
    ) -> Self {
        let nonce: [u8; 16] = rand::random();
        Self {
            miner_id: miner_id.into(),
            task_id: task_id.into(),
            claimed_score,
            artifact_hash: artifact_hash.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            nonce: hex::encode(nonce),
        }
    }
}

/// Typed view over the coordinator's submit response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub status: String,
    #[serde(default)]
    pub submission_id: Option<String>,
    #[serde(default)]
    pub estimated_verification_time_seconds: Option<u32>,
}

impl SubmissionResponse {
    pub fn from_map(map: &Map<String, Value>) -> serde_json::Result<Self> {
        serde_json::from_value(Value::Object(map.clone()))
    }
}
