//! Launching the protoc binary

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable consulted for the protoc binary, as `prost-build` does
pub const PROTOC_ENV: &str = "PROTOC";

/// Something that can run protoc with a prepared argument list
///
/// The invoker only cares about the exit code; output from the compiler goes
/// straight to the parent's stdout/stderr.
#[cfg_attr(test, mockall::automock)]
pub trait ProtocRunner {
    /// Human-readable name of the binary, used in error messages
    fn program(&self) -> String;

    /// Run to completion and return the exit code
    fn run(&self, args: &[String]) -> io::Result<i32>;
}

/// Runs a protoc binary found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemProtoc {
    binary: PathBuf,
}

impl SystemProtoc {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Pick the binary to run
    ///
    /// An explicit path wins, then `$PROTOC`, then plain `protoc` looked up on
    /// `PATH` at launch time.
    pub fn resolve(explicit: Option<&str>) -> Self {
        if let Some(path) = explicit.filter(|p| !p.is_empty()) {
            return Self::new(path);
        }
        match env::var_os(PROTOC_ENV) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::new("protoc"),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for SystemProtoc {
    fn default() -> Self {
        Self::resolve(None)
    }
}

impl ProtocRunner for SystemProtoc {
    fn program(&self) -> String {
        self.binary.display().to_string()
    }

    fn run(&self, args: &[String]) -> io::Result<i32> {
        let status = Command::new(&self.binary).args(args).status()?;
        // Killed by a signal: no code to report.
        Ok(status.code().unwrap_or(-1))
    }
}
