use std::fmt;

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::Serialize;

use crate::canonical::to_canonical_vec;
use crate::error::{Result, SdkError};
use crate::types::ClaimPayload;

/// Length of a hex-encoded Ed25519 seed.
pub const SEED_HEX_LEN: usize = 64;

/// Ed25519 identity used to sign claims. Built once, read-only afterwards.
pub struct ClaimSigner {
    sk: SigningKey,
}

impl ClaimSigner {
    pub fn from_hex(sk_hex: &str) -> Result<Self> {
        if sk_hex.len() != SEED_HEX_LEN {
            return Err(SdkError::InvalidKeyMaterial(format!(
                "expected {} hex characters, got {}",
                SEED_HEX_LEN,
                sk_hex.len()
            )));
        }
        let bytes = hex::decode(sk_hex)?;
        let seed: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| SdkError::InvalidKeyMaterial("seed must be 32 bytes".to_string()))?;
        Ok(Self { sk: SigningKey::from_bytes(&seed) })
    }

    /// Signs the canonical encoding of any JSON-shaped payload.
    pub fn sign<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String> {
        let msg = to_canonical_vec(payload)?;
        Ok(self.sign_bytes(&msg))
    }

    pub fn sign_claim(&self, payload: &ClaimPayload) -> Result<String> {
        self.sign(payload)
    }

    pub fn sign_bytes(&self, msg: &[u8]) -> String {
        let sig: Signature = self.sk.sign(msg);
        hex::encode(sig.to_bytes())
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.sk.verifying_key().to_bytes())
    }
}

impl fmt::Debug for ClaimSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimSigner")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

/// Checks `signature_hex` against the canonical encoding of `payload`, the way a
/// coordinator would. Returns `Ok(false)` for a well-formed but wrong signature.
pub fn verify<T: Serialize + ?Sized>(
    public_key_hex: &str,
    payload: &T,
    signature_hex: &str,
) -> Result<bool> {
    let pk: [u8; 32] = hex::decode(public_key_hex)?
        .as_slice()
        .try_into()
        .map_err(|_| SdkError::InvalidKeyMaterial("public key must be 32 bytes".to_string()))?;
    let vk = VerifyingKey::from_bytes(&pk)
        .map_err(|e| SdkError::InvalidKeyMaterial(e.to_string()))?;
    let sig: [u8; 64] = hex::decode(signature_hex)?
        .as_slice()
        .try_into()
        .map_err(|_| SdkError::InvalidKeyMaterial("signature must be 64 bytes".to_string()))?;
    let msg = to_canonical_vec(payload)?;
    Ok(vk.verify(&msg, &Signature::from_bytes(&sig)).is_ok())
}
