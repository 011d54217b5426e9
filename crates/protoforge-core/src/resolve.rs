//! External tool discovery.
//!
//! Locates the schema compiler and the gRPC codegen plugin. Resolution order,
//! highest priority first:
//!
//! 1. Explicit path from the request
//! 2. Environment (`PROTOC` for the compiler; `GRPC_CPP_PLUGIN` or
//!    `PROTOC_GEN_GRPC` for the plugin)
//! 3. `$PATH` lookup
//! 4. Well-known fallback locations
//!
//! Candidates are deduplicated; the first existing executable regular file
//! wins. When nothing matches, the error lists every candidate tried.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const PROTOC_FALLBACKS: &[&str] = &["/usr/bin/protoc", "/usr/local/bin/protoc"];
const GRPC_PLUGIN_FALLBACKS: &[&str] = &[
    "/usr/bin/grpc_cpp_plugin",
    "/usr/local/bin/grpc_cpp_plugin",
];

/// Locate the schema compiler binary.
pub fn find_protoc(explicit: Option<&Path>) -> Result<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(p) = explicit {
        candidates.push(p.to_path_buf());
    }
    if let Some(v) = env_path("PROTOC") {
        candidates.push(v);
    }
    if let Some(p) = search_path("protoc") {
        candidates.push(p);
    }
    candidates.extend(PROTOC_FALLBACKS.iter().map(PathBuf::from));
    pick("protoc", candidates)
}

/// Locate the gRPC codegen plugin binary.
pub fn find_grpc_plugin(explicit: Option<&Path>) -> Result<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(p) = explicit {
        candidates.push(p.to_path_buf());
    }
    if let Some(v) = env_path("GRPC_CPP_PLUGIN").or_else(|| env_path("PROTOC_GEN_GRPC")) {
        candidates.push(v);
    }
    if let Some(p) = search_path("grpc_cpp_plugin") {
        candidates.push(p);
    }
    candidates.extend(GRPC_PLUGIN_FALLBACKS.iter().map(PathBuf::from));
    pick("grpc_cpp_plugin", candidates)
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// First executable candidate, with duplicates skipped.
fn pick(tool: &str, candidates: Vec<PathBuf>) -> Result<PathBuf> {
    let mut seen = Vec::new();
    for candidate in candidates {
        if seen.contains(&candidate) {
            continue;
        }
        seen.push(candidate.clone());
        if is_executable(&candidate) {
            return Ok(candidate);
        }
    }

    Err(Error::ToolNotFound {
        tool: tool.to_string(),
        tried: seen
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

fn search_path(bin: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(bin))
        .find(|c| is_executable(c))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.is_file()
        && std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[cfg(unix)]
    fn make_executable(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_pick_first_executable_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let real = make_executable(dir.path(), "protoc");

        let found = pick("protoc", vec![missing, real.clone()]).unwrap();
        assert_eq!(found, real);
    }

    #[cfg(unix)]
    #[test]
    fn test_pick_skips_non_executable_file() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("protoc");
        fs::write(&plain, "not a binary").unwrap();
        let real = make_executable(dir.path(), "protoc-real");

        let found = pick("protoc", vec![plain, real.clone()]).unwrap();
        assert_eq!(found, real);
    }

    #[test]
    fn test_pick_reports_all_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        let err = pick("grpc_cpp_plugin", vec![a.clone(), a.clone(), b.clone()]).unwrap_err();
        match err {
            Error::ToolNotFound { tool, tried } => {
                assert_eq!(tool, "grpc_cpp_plugin");
                assert!(tried.contains(&a.display().to_string()));
                assert!(tried.contains(&b.display().to_string()));
                // Duplicates collapse to one mention
                assert_eq!(tried.matches(&a.display().to_string()).count(), 1);
            }
            other => panic!("expected ToolNotFound, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_explicit_path_beats_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = make_executable(dir.path(), "my-protoc");
        let found = find_protoc(Some(&explicit)).unwrap();
        assert_eq!(found, explicit);
    }
}
