pub mod types;
pub mod error;
pub mod canonical;
mod finite;
pub mod signing;
pub mod archive;
pub mod transport;
pub mod client;
pub mod config;
pub mod sdk;

pub use client::NotaryClient;
pub use config::{ConfigError, SdkConfig};
pub use error::{Result, SdkError};
pub use sdk::{MinerSdk, DEFAULT_NOTARY_URL};
pub use signing::ClaimSigner;
pub use transport::{FormPart, HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{ClaimPayload, Hyperparameters, SubmissionResponse, Task};
