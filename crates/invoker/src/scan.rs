//! Discovery of `.proto` files under a directory tree

use crate::{InvocationError, Result};
use std::collections::BTreeSet;
use std::io;
use std::path::{self, Path, PathBuf};
use walkdir::WalkDir;

/// Extension that marks a schema file
pub const PROTO_EXTENSION: &str = ".proto";

/// Find every `.proto` file under `root`, at any depth
///
/// Returns absolute path strings, deduplicated and sorted. Any error during
/// the walk aborts the scan; a partial listing is never returned. Schema
/// paths that are not valid UTF-8 fail the scan, since protoc receives them
/// as string arguments.
pub fn scan_proto_files(root: &Path) -> Result<BTreeSet<String>> {
    let scan_failed = |source: io::Error| InvocationError::ScanFailed {
        root: root.to_path_buf(),
        source,
    };

    let root: PathBuf = path::absolute(root)
        .map_err(scan_failed)?
        .components()
        .collect();

    let mut files = BTreeSet::new();
    for entry in WalkDir::new(&root) {
        let entry = entry.map_err(|e| scan_failed(e.into()))?;
        if entry.file_type().is_dir() || !is_proto_file(entry.path()) {
            continue;
        }
        let file = entry.path().to_str().ok_or_else(|| {
            scan_failed(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("path is not valid UTF-8: {}", entry.path().display()),
            ))
        })?;
        log::trace!("Found proto file {}", file);
        files.insert(file.to_string());
    }

    log::debug!("Found {} proto files under {}", files.len(), root.display());
    Ok(files)
}

fn is_proto_file(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().ends_with(PROTO_EXTENSION.as_bytes()))
}
