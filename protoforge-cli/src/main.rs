//! protoforge - schema build orchestrator CLI.
//!
//! Resolves proto files against include paths, drives the external schema
//! compiler to emit a descriptor set plus C++/gRPC stubs, and verifies the
//! declared outputs exist.
//!
//! Usage:
//!     protoforge -I proto --proto-file plugin_a.proto
//!     protoforge -I proto --proto-root vendor/proto --proto-file plugin_a.proto --json

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use protoforge_core::{build, BuildRequest};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "protoforge")]
#[command(about = "Schema build orchestrator: compiles protos into a descriptor set and gRPC stubs")]
#[command(version)]
struct Args {
    /// Include path (can be specified multiple times)
    #[arg(short = 'I', long = "include")]
    include: Vec<PathBuf>,

    /// Schema file to compile (can be specified multiple times)
    #[arg(long = "proto-file", visible_alias = "proto", required = true)]
    proto_file: Vec<PathBuf>,

    /// Directory for the descriptor set and generated files
    #[arg(long, default_value = "tmp")]
    build_dir: PathBuf,

    /// Vendored proto directory, searched after the include paths
    #[arg(long)]
    proto_root: Option<PathBuf>,

    /// Path to the schema compiler (default: auto-detect via $PROTOC, $PATH)
    #[arg(long)]
    protoc: Option<PathBuf>,

    /// Path to grpc_cpp_plugin (default: auto-detect, fallback /usr/bin/grpc_cpp_plugin)
    #[arg(long)]
    grpc_plugin: Option<PathBuf>,

    /// Base name for the descriptor-set file (default: first proto's stem)
    #[arg(long)]
    name: Option<String>,

    /// Never reuse an existing build directory; allocate a numbered sibling
    #[arg(long)]
    fresh: bool,

    /// Print the build result as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Log level (debug, info, warn, error); RUST_LOG overrides
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    protoforge_core::tracing::init_with_filter(&args.log_level);

    let mut request = BuildRequest::new(args.include, args.proto_file, args.build_dir);
    request.name = args.name;
    request.protoc = args.protoc;
    request.grpc_plugin = args.grpc_plugin;
    request.proto_root = args.proto_root;
    request.fresh = args.fresh;

    match build(request) {
        Ok(result) => {
            if args.json {
                match serde_json::to_string_pretty(&result) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        error!("failed to serialize build result: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                println!("{}", result.descriptor_path.display());
                for artifact in &result.generated {
                    println!("{}", artifact.display());
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
