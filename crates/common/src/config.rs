//! Proto configuration loading from YAML or JSON files
//!
//! A configuration names the root of a `.proto` tree and any extra include
//! directories protoc needs to resolve imports outside of it.

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Where to find schema files and how to compile them
///
/// ```yaml
/// root_directory: proto
/// include_paths:
///   - third_party/googleapis
/// protoc_path: /usr/local/bin/protoc
/// keep_descriptor_file: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProtoConfiguration {
    /// Root of the `.proto` tree, also passed as `--proto_path`
    pub root_directory: String,

    /// Additional `-I` directories, in the order they should be searched
    #[serde(default)]
    pub include_paths: Vec<String>,

    /// Explicit protoc binary (falls back to `$PROTOC`, then `protoc` on `PATH`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protoc_path: Option<String>,

    /// Leave the temporary descriptor file on disk after each run
    #[serde(default = "default_keep_descriptor_file")]
    pub keep_descriptor_file: bool,
}

fn default_keep_descriptor_file() -> bool {
    true
}

impl ProtoConfiguration {
    /// Create a configuration rooted at `root_directory` with no includes
    pub fn new(root_directory: impl Into<String>) -> Self {
        Self {
            root_directory: root_directory.into(),
            include_paths: Vec::new(),
            protoc_path: None,
            keep_descriptor_file: default_keep_descriptor_file(),
        }
    }

    pub fn with_include_path(mut self, path: impl Into<String>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    pub fn with_protoc_path(mut self, path: impl Into<String>) -> Self {
        self.protoc_path = Some(path.into());
        self
    }

    pub fn with_keep_descriptor_file(mut self, keep: bool) -> Self {
        self.keep_descriptor_file = keep;
        self
    }

    /// Load a configuration file
    ///
    /// Files ending in `.json` are read as JSON, everything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }
}
