//! Schema compiler invocation and output verification.
//!
//! Argument shape, for include dirs `a b`, name `plugin_a`, protos `x.proto`:
//!
//! ```text
//! protoc -Ia -Ib --include_imports \
//!     --descriptor_set_out=<build>/desc/plugin_a.desc.pb \
//!     --cpp_out=<build>/gen --grpc_out=<build>/gen \
//!     --plugin=protoc-gen-grpc=<plugin> x.proto
//! ```
//!
//! The run is synchronous and blocking with captured output. No retries: the
//! invocation is deterministic, so a failure is surfaced immediately.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::request::ResolvedProto;
use crate::workdir::BuildDirs;

/// Suffixes the C++ and gRPC generators emit for a proto at `<rel>.proto`.
const GENERATED_SUFFIXES: &[&str] = &["pb.cc", "pb.h", "grpc.pb.cc", "grpc.pb.h"];

/// A fully assembled compiler command, ready to run.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Compiler binary
    pub protoc: PathBuf,
    /// Arguments, in the order they are passed
    pub args: Vec<String>,
    /// Where the descriptor set lands
    pub descriptor_out: PathBuf,
}

impl Invocation {
    /// Assemble the command line for one compiler run.
    pub fn assemble(
        protoc: &Path,
        grpc_plugin: &Path,
        includes: &[PathBuf],
        protos: &[ResolvedProto],
        dirs: &BuildDirs,
        name: &str,
    ) -> Self {
        let descriptor_out = dirs.descriptor_path(name);

        let mut args = Vec::new();
        for inc in includes {
            args.push(format!("-I{}", inc.display()));
        }
        args.push("--include_imports".to_string());
        args.push(format!("--descriptor_set_out={}", descriptor_out.display()));
        args.push(format!("--cpp_out={}", dirs.gen.display()));
        args.push(format!("--grpc_out={}", dirs.gen.display()));
        args.push(format!("--plugin=protoc-gen-grpc={}", grpc_plugin.display()));
        // The compiler maps file arguments onto -I roots by textual prefix, so
        // the include-relative path goes on the command line, never the
        // canonical absolute one.
        for proto in protos {
            args.push(proto.rel.display().to_string());
        }

        Self {
            protoc: protoc.to_path_buf(),
            args,
            descriptor_out,
        }
    }

    /// Run the compiler, capturing output.
    ///
    /// Non-zero exit becomes [`Error::Compilation`] carrying the captured
    /// diagnostics; stderr from a successful run is forwarded as warnings.
    pub fn run(&self) -> Result<()> {
        info!("{} {}", self.protoc.display(), self.args.join(" "));

        let output = Command::new(&self.protoc).args(&self.args).output()?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(Error::Compilation {
                code: output.status.code(),
                stderr,
            });
        }

        for line in stderr.lines() {
            warn!("compiler: {line}");
        }
        Ok(())
    }
}

/// Verify the declared outputs of a successful run.
///
/// The descriptor set and every generated artifact must exist and be
/// non-empty; otherwise [`Error::MissingOutput`] lists what is absent.
/// Returns the generated source/header paths.
pub fn verify_outputs(
    dirs: &BuildDirs,
    descriptor_out: &Path,
    protos: &[ResolvedProto],
) -> Result<Vec<PathBuf>> {
    let mut generated = Vec::new();
    for proto in protos {
        for suffix in GENERATED_SUFFIXES {
            generated.push(dirs.gen.join(proto.rel.with_extension(suffix)));
        }
    }

    let mut missing: Vec<PathBuf> = Vec::new();
    if !non_empty_file(descriptor_out) {
        missing.push(descriptor_out.to_path_buf());
    }
    missing.extend(generated.iter().filter(|p| !non_empty_file(p)).cloned());

    if !missing.is_empty() {
        return Err(Error::MissingOutput { missing });
    }
    Ok(generated)
}

fn non_empty_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
}
