//! Build request model and proto path resolution.
//!
//! A [`BuildRequest`] is constructed once per invocation from CLI arguments,
//! consumed by [`crate::build`], and discarded. Before the compiler is spawned,
//! every proto file must resolve under at least one include path; the
//! include-relative path of each file also determines which generated artifacts
//! the orchestrator expects to find afterwards.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Everything needed for one orchestrated compiler run.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Include directories, in search order (`-I`)
    pub includes: Vec<PathBuf>,
    /// Schema files to compile
    pub protos: Vec<PathBuf>,
    /// Build root; `desc/` and `gen/` are created beneath it
    pub build_dir: PathBuf,
    /// Base name for the descriptor-set file; defaults to the first proto's stem
    pub name: Option<String>,
    /// Explicit compiler binary; discovered when absent
    pub protoc: Option<PathBuf>,
    /// Explicit gRPC codegen plugin binary; discovered when absent
    pub grpc_plugin: Option<PathBuf>,
    /// Vendored proto directory, appended to the include paths.
    /// This is an explicit field on purpose: there is no process-wide default.
    pub proto_root: Option<PathBuf>,
    /// Allocate a numbered sibling (`tmp_1`, `tmp_2`, …) instead of reusing an
    /// existing build root
    pub fresh: bool,
}

impl BuildRequest {
    /// Create a request over the given includes and protos, with defaults for
    /// everything else.
    pub fn new(
        includes: impl IntoIterator<Item = PathBuf>,
        protos: impl IntoIterator<Item = PathBuf>,
        build_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            includes: includes.into_iter().collect(),
            protos: protos.into_iter().collect(),
            build_dir: build_dir.into(),
            name: None,
            protoc: None,
            grpc_plugin: None,
            proto_root: None,
            fresh: false,
        }
    }

    /// Include directories in `-I` order, with the vendored proto root last.
    pub fn effective_includes(&self) -> Vec<PathBuf> {
        let mut dirs = self.includes.clone();
        if let Some(root) = &self.proto_root {
            dirs.push(root.clone());
        }
        dirs
    }

    /// Base name used for the descriptor-set file.
    pub fn artifact_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.protos
            .first()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "schema".to_string())
    }

    /// Resolve every proto file against the include paths.
    ///
    /// Fails with [`Error::PathResolution`] on the first file that is not
    /// reachable, before any subprocess is spawned.
    pub fn resolve_protos(&self) -> Result<Vec<ResolvedProto>> {
        let includes = self.effective_includes();
        self.protos
            .iter()
            .map(|p| resolve_one(p, &includes))
            .collect()
    }
}

/// A schema file located under an include directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProto {
    /// Canonical absolute location on disk
    pub path: PathBuf,
    /// Path relative to the include root that contains it; this is what gets
    /// passed to the compiler, and generated artifact names derive from it
    pub rel: PathBuf,
}

fn resolve_one(proto: &Path, includes: &[PathBuf]) -> Result<ResolvedProto> {
    // Relative paths search the includes in order, first hit wins. A
    // same-named file in the working directory must not shadow an include hit.
    if proto.is_relative() {
        for inc in includes {
            let candidate = inc.join(proto);
            if candidate.is_file() {
                return Ok(ResolvedProto {
                    path: candidate.canonicalize()?,
                    rel: proto.to_path_buf(),
                });
            }
        }
    }

    // An explicit path to an existing file still has to live under one of the
    // include directories, otherwise the compiler cannot map it to a virtual
    // path or resolve its imports.
    if proto.is_file() {
        if let Ok(abs) = proto.canonicalize() {
            for inc in includes {
                let Ok(inc_abs) = inc.canonicalize() else {
                    continue;
                };
                if let Ok(rel) = abs.strip_prefix(&inc_abs) {
                    let rel = rel.to_path_buf();
                    return Ok(ResolvedProto { path: abs, rel });
                }
            }
        }
    }

    Err(Error::PathResolution {
        path: proto.to_path_buf(),
        searched: includes
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_relative_under_include() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("demo.proto"), "syntax = \"proto3\";").unwrap();

        let req = BuildRequest::new(
            [dir.path().to_path_buf()],
            [PathBuf::from("demo.proto")],
            "tmp",
        );
        let resolved = req.resolve_protos().unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].rel, PathBuf::from("demo.proto"));
        assert!(resolved[0].path.is_absolute());
    }

    #[test]
    fn test_resolve_nested_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("svc/v1")).unwrap();
        fs::write(dir.path().join("svc/v1/api.proto"), "syntax = \"proto3\";").unwrap();

        let req = BuildRequest::new(
            [dir.path().to_path_buf()],
            [PathBuf::from("svc/v1/api.proto")],
            "tmp",
        );
        let resolved = req.resolve_protos().unwrap();
        assert_eq!(resolved[0].rel, PathBuf::from("svc/v1/api.proto"));
    }

    #[test]
    fn test_resolve_absolute_path_under_include() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("demo.proto");
        fs::write(&file, "syntax = \"proto3\";").unwrap();

        let req = BuildRequest::new([dir.path().to_path_buf()], [file], "tmp");
        let resolved = req.resolve_protos().unwrap();
        assert_eq!(resolved[0].rel, PathBuf::from("demo.proto"));
    }

    #[test]
    fn test_working_directory_file_does_not_shadow_include_hit() {
        let dir = tempfile::tempdir().unwrap();
        let include = dir.path().join("proto");
        fs::create_dir_all(&include).unwrap();
        fs::write(include.join("demo.proto"), "syntax = \"proto3\";").unwrap();

        // Stray same-named file in the working directory; the include copy
        // must still win.
        let stray_cwd = dir.path().join("cwd");
        fs::create_dir_all(&stray_cwd).unwrap();
        fs::write(stray_cwd.join("demo.proto"), "// stray").unwrap();

        let old_cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(&stray_cwd).unwrap();

        let req = BuildRequest::new(
            [include.clone()],
            [PathBuf::from("demo.proto")],
            dir.path().join("tmp"),
        );
        let resolved = req.resolve_protos();
        std::env::set_current_dir(old_cwd).unwrap();

        let resolved = resolved.unwrap();
        assert_eq!(resolved[0].rel, PathBuf::from("demo.proto"));
        assert!(resolved[0].path.starts_with(include.canonicalize().unwrap()));
    }

    #[test]
    fn test_existing_file_outside_includes_fails() {
        let inc = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let file = other.path().join("stray.proto");
        fs::write(&file, "syntax = \"proto3\";").unwrap();

        let req = BuildRequest::new([inc.path().to_path_buf()], [file], "tmp");
        let err = req.resolve_protos().unwrap_err();
        assert!(matches!(err, Error::PathResolution { .. }));
    }

    #[test]
    fn test_missing_proto_reports_searched_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let req = BuildRequest::new(
            [dir.path().to_path_buf()],
            [PathBuf::from("nope.proto")],
            "tmp",
        );
        let err = req.resolve_protos().unwrap_err();
        match err {
            Error::PathResolution { path, searched } => {
                assert_eq!(path, PathBuf::from("nope.proto"));
                assert!(searched.contains(&dir.path().display().to_string()));
            }
            other => panic!("expected PathResolution, got {other:?}"),
        }
    }

    #[test]
    fn test_proto_root_is_searched_last() {
        let inc = tempfile::tempdir().unwrap();
        let vendored = tempfile::tempdir().unwrap();
        fs::write(vendored.path().join("shared.proto"), "syntax = \"proto3\";").unwrap();

        let mut req = BuildRequest::new(
            [inc.path().to_path_buf()],
            [PathBuf::from("shared.proto")],
            "tmp",
        );
        req.proto_root = Some(vendored.path().to_path_buf());

        let resolved = req.resolve_protos().unwrap();
        assert_eq!(resolved[0].rel, PathBuf::from("shared.proto"));

        let includes = req.effective_includes();
        assert_eq!(includes.last().unwrap(), &vendored.path().to_path_buf());
    }

    #[test]
    fn test_artifact_name_defaults_to_first_stem() {
        let req = BuildRequest::new([], [PathBuf::from("svc/v1/api.proto")], "tmp");
        assert_eq!(req.artifact_name(), "api");

        let mut named = req.clone();
        named.name = Some("plugin_a".to_string());
        assert_eq!(named.artifact_name(), "plugin_a");
    }
}
