//! Common error types for protoforge operations.

use std::path::PathBuf;
use thiserror::Error;

/// Common error type for build orchestration.
///
/// Every variant is fatal: the orchestrator surfaces the first failure to the
/// caller and never retries (the compiler invocation is deterministic).
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Descriptor-set decode error
    #[error("descriptor decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A proto file could not be resolved under any include path
    #[error("cannot resolve {path}: not found under any include path (searched: {searched})")]
    PathResolution {
        /// The proto path as given in the request
        path: PathBuf,
        /// Comma-joined list of directories searched
        searched: String,
    },

    /// An external tool binary could not be located
    #[error("{tool} not found (tried: {tried}); install it or pass an explicit path")]
    ToolNotFound {
        /// Tool name, e.g. "protoc"
        tool: String,
        /// Comma-joined list of candidate locations tried
        tried: String,
    },

    /// The schema compiler exited with a non-zero status
    #[error("schema compiler failed {}:\n{stderr}", exit_label(.code))]
    Compilation {
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured compiler diagnostics
        stderr: String,
    },

    /// A declared output artifact is absent or empty after a successful run
    #[error("compiler reported success but expected outputs are missing or empty: {}", join_paths(.missing))]
    MissingOutput {
        /// The absent or empty artifact paths
        missing: Vec<PathBuf>,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("with exit code {}", c),
        None => "(killed by signal)".to_string(),
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias using the protoforge Error.
pub type Result<T> = std::result::Result<T, Error>;
