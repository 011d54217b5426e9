//! # protoforge core
//!
//! Schema build orchestration for gRPC plugin stubs:
//! - **request**: build request model and proto path resolution
//! - **resolve**: compiler and codegen-plugin binary discovery
//! - **workdir**: build directory layout (`desc/` + `gen/`)
//! - **compiler**: compiler invocation and output verification
//! - **descriptor**: descriptor-set inspection (files, imports, digest)
//! - **error**: common error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use protoforge_core::{build, BuildRequest};
//!
//! let request = BuildRequest::new(includes, protos, "tmp");
//! let result = build(request)?;
//! println!("{}", result.descriptor_path.display());
//! ```

pub mod compiler;
pub mod descriptor;
pub mod error;
pub mod request;
pub mod resolve;
pub mod tracing;
pub mod workdir;

use std::path::PathBuf;

use ::tracing::info;

use crate::compiler::Invocation;
use crate::workdir::BuildDirs;

pub use descriptor::DescriptorInfo;
pub use error::{Error, Result};
pub use request::{BuildRequest, ResolvedProto};

/// Outcome of a successful orchestrated build.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildResult {
    /// Path of the emitted descriptor set
    pub descriptor_path: PathBuf,
    /// Generated source/header artifacts, all verified to exist non-empty
    pub generated: Vec<PathBuf>,
    /// What the descriptor set contains
    pub descriptor: DescriptorInfo,
}

/// Run one build: resolve, invoke, verify, inspect.
///
/// Stages, each fatal on failure:
/// 1. Resolve every proto under the include paths ([`Error::PathResolution`])
/// 2. Locate the compiler and the gRPC plugin ([`Error::ToolNotFound`])
/// 3. Prepare the build directory and invoke the compiler
///    ([`Error::Compilation`] on non-zero exit)
/// 4. Verify declared outputs exist non-empty ([`Error::MissingOutput`])
/// 5. Decode the descriptor set ([`Error::Decode`])
pub fn build(request: BuildRequest) -> Result<BuildResult> {
    let resolved = request.resolve_protos()?;
    let protoc = resolve::find_protoc(request.protoc.as_deref())?;
    let grpc_plugin = resolve::find_grpc_plugin(request.grpc_plugin.as_deref())?;

    let dirs = BuildDirs::prepare(&request.build_dir, request.fresh)?;
    let invocation = Invocation::assemble(
        &protoc,
        &grpc_plugin,
        &request.effective_includes(),
        &resolved,
        &dirs,
        &request.artifact_name(),
    );

    invocation.run()?;
    let generated = compiler::verify_outputs(&dirs, &invocation.descriptor_out, &resolved)?;
    let descriptor = descriptor::inspect(&invocation.descriptor_out)?;

    info!(
        "built {} schema file(s), descriptor {} ({})",
        descriptor.files.len(),
        invocation.descriptor_out.display(),
        &descriptor.digest[..16],
    );

    Ok(BuildResult {
        descriptor_path: invocation.descriptor_out,
        generated,
        descriptor,
    })
}
