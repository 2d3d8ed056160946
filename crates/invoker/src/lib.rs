//! Protoc invocation for whole `.proto` trees
//!
//! This crate finds every schema file under a root directory, runs protoc on
//! them, and parses the `FileDescriptorSet` it writes.
//!
//! ## Invocation
//!
//! For each call to [`ProtocInvoker::invoke`]:
//! - A fresh temporary file is created for `--descriptor_set_out`
//! - The tree is scanned for `*.proto` files (absolute paths, any depth)
//! - protoc runs with `-I` for every include directory, `--include_imports`
//!   and `--proto_path` set to the configured root
//! - A zero exit code means the temporary file is read back and decoded
//!
//! Parsing `.proto` syntax, generating code, and validating schemas are all
//! left to protoc.

mod error;
mod invoker;
pub mod runner;
mod scan;
mod summary;

pub use error::{InvocationError, Result};
pub use invoker::ProtocInvoker;
pub use runner::{ProtocRunner, SystemProtoc};
pub use scan::{scan_proto_files, PROTO_EXTENSION};
pub use summary::{DescriptorSummary, FileSummary, ServiceSummary};

pub use prost_reflect::DescriptorPool;
pub use prost_types::FileDescriptorSet;
pub use protoc_invoker_common::ProtoConfiguration;
