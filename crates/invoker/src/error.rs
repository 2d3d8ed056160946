//! Errors raised while preparing or running a protoc invocation

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between reading a configuration and handing
/// back a parsed descriptor set
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("Invalid proto configuration: {0}")]
    ConfigInvalid(String),

    #[error("Unable to scan proto tree for files under {}: {source}", root.display())]
    ScanFailed {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to create temporary file in {}: {source}", dir.display())]
    TempFileFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to execute protoc binary {program}: {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Got exit code [{code}] from protoc with args [{}]", args.join(", "))]
    NonZeroExit { code: i32, args: Vec<String> },

    #[error("Unable to read the generated descriptors at {}: {source}", path.display())]
    OutputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse the generated descriptors at {}: {source}", path.display())]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: prost::DecodeError,
    },

    #[error("Failed to create DescriptorPool: {0}")]
    PoolFailed(#[from] prost_reflect::DescriptorError),
}

/// Result type for invoker operations
pub type Result<T> = std::result::Result<T, InvocationError>;
