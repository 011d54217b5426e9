//! Descriptor-set inspection.
//!
//! After a successful compile the emitted `FileDescriptorSet` is decoded to
//! record which schema files it captured, their import graph, and a digest of
//! the raw bytes. The digest doubles as an idempotence check: identical
//! requests produce byte-identical descriptor sets.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use prost::Message;
use prost_types::FileDescriptorSet;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::Result;

/// What a descriptor set contains.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DescriptorInfo {
    /// Schema file names captured in the set, in compiler order
    pub files: Vec<String>,
    /// File name to its declared imports
    pub imports: BTreeMap<String, Vec<String>>,
    /// SHA-256 hex digest of the raw descriptor bytes
    pub digest: String,
}

/// Decode and summarize the descriptor set at `path`.
///
/// Warns about imports that are absent from the set itself; with
/// `--include_imports` the compiler should have captured them all.
pub fn inspect(path: &Path) -> Result<DescriptorInfo> {
    let bytes = fs::read(path)?;
    let fds = FileDescriptorSet::decode(bytes.as_slice())?;

    let files: Vec<String> = fds.file.iter().map(|f| f.name().to_string()).collect();
    let imports = import_graph(&fds);

    for (file, deps) in &imports {
        for dep in deps {
            if !files.iter().any(|f| f == dep) {
                warn!("{file} imports {dep}, which is not in the descriptor set");
            }
        }
    }

    Ok(DescriptorInfo {
        files,
        imports,
        digest: sha256_hex(&bytes),
    })
}

fn import_graph(fds: &FileDescriptorSet) -> BTreeMap<String, Vec<String>> {
    fds.file
        .iter()
        .map(|f| (f.name().to_string(), f.dependency.clone()))
        .collect()
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
