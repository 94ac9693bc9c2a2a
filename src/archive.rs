//! Reproducibility package: a gzip-compressed tar holding exactly
//! `hyperparameters.json` followed by `train.wasm`.

use std::io::Read;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tar::{Archive, Builder, EntryType, Header};
use tracing::debug;

use crate::error::{Result, SdkError};
use crate::finite::ensure_finite;
use crate::types::Hyperparameters;

pub const HYPERPARAMETERS_ENTRY: &str = "hyperparameters.json";
pub const MODULE_ENTRY: &str = "train.wasm";
/// Filename the archive is uploaded under.
pub const ARCHIVE_FILENAME: &str = "submission.tar.gz";

/// Decoded contents of a package archive.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub hyperparameters: Hyperparameters,
    pub module: Vec<u8>,
}

/// Builds a fresh package archive in memory.
pub fn build<H: Serialize + ?Sized>(hyperparameters: &H, module: &[u8]) -> Result<Vec<u8>> {
    ensure_finite(hyperparameters)?;
    let value = serde_json::to_value(hyperparameters)?;
    if !value.is_object() {
        return Err(SdkError::Serialization(
            "hyperparameters must serialize to a JSON object".to_string(),
        ));
    }
    let json = serde_json::to_vec_pretty(&value)?;

    let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    append_entry(&mut builder, HYPERPARAMETERS_ENTRY, &json)?;
    append_entry(&mut builder, MODULE_ENTRY, module)?;
    let encoder = builder.into_inner().map_err(write_failed)?;
    let bytes = encoder.finish().map_err(write_failed)?;

    debug!(
        hyperparameters_len = json.len(),
        module_len = module.len(),
        archive_len = bytes.len(),
        "built package archive"
    );
    Ok(bytes)
}

fn append_entry(
    builder: &mut Builder<GzEncoder<Vec<u8>>>,
    name: &str,
    data: &[u8],
) -> Result<()> {
    let mut header = Header::new_ustar();
    header.set_entry_type(EntryType::Regular);
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(0);
    builder.append_data(&mut header, name, data).map_err(write_failed)
}

fn write_failed(e: std::io::Error) -> SdkError {
    SdkError::Serialization(format!("writing archive: {}", e))
}

/// Unpacks an archive produced by [`build`]. Anything other than the two
/// expected entries, in order, is rejected.
pub fn read(bytes: &[u8]) -> Result<Package> {
    let bad = |e: std::io::Error| SdkError::InvalidArchive(e.to_string());

    let mut archive = Archive::new(GzDecoder::new(bytes));
    let mut names = Vec::new();
    let mut hyperparameters = None;
    let mut module = None;

    for entry in archive.entries().map_err(bad)? {
        let mut entry = entry.map_err(bad)?;
        let name = entry.path().map_err(bad)?.to_string_lossy().into_owned();
        // Header sizes are untrusted; let read_to_end grow the buffer.
        let mut data = Vec::new();
        entry.read_to_end(&mut data).map_err(bad)?;

        match name.as_str() {
            HYPERPARAMETERS_ENTRY => {
                let map: Hyperparameters = serde_json::from_slice(&data).map_err(|e| {
                    SdkError::InvalidArchive(format!("{}: {}", HYPERPARAMETERS_ENTRY, e))
                })?;
                hyperparameters = Some(map);
            }
            MODULE_ENTRY => module = Some(data),
            _ => {}
        }
        names.push(name);
    }

    if names != [HYPERPARAMETERS_ENTRY, MODULE_ENTRY] {
        return Err(SdkError::InvalidArchive(format!(
            "expected entries [{}, {}], found {:?}",
            HYPERPARAMETERS_ENTRY, MODULE_ENTRY, names
        )));
    }
    match (hyperparameters, module) {
        (Some(hyperparameters), Some(module)) => Ok(Package { hyperparameters, module }),
        _ => Err(SdkError::InvalidArchive("missing entry".to_string())),
    }
}

/// SHA-256 of the archive bytes, hex-encoded.
pub fn digest_hex(archive: &[u8]) -> String {
    hex::encode(Sha256::digest(archive))
}
