//! The protoc invoker itself

use crate::runner::{ProtocRunner, SystemProtoc};
use crate::scan::scan_proto_files;
use crate::{InvocationError, Result};
use prost::Message;
use prost_reflect::DescriptorPool;
use prost_types::FileDescriptorSet;
use protoc_invoker_common::ProtoConfiguration;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{self, Path, PathBuf};

const DESCRIPTOR_PREFIX: &str = "descriptor";
const DESCRIPTOR_SUFFIX: &str = ".pb.bin";

/// Runs protoc on every `.proto` file in a directory tree
///
/// Holds only resolved, absolute paths taken from a [`ProtoConfiguration`],
/// so a single invoker can be reused for any number of invocations. Each
/// invocation gets its own temporary descriptor file.
#[derive(Debug)]
pub struct ProtocInvoker<R = SystemProtoc> {
    /// Passed to protoc as `--proto_path`
    proto_root: PathBuf,

    /// Extra `-I` directories, absolute, in configuration order
    include_paths: Vec<PathBuf>,

    /// Where descriptor files are created (platform temp dir if unset)
    temp_dir: Option<PathBuf>,

    keep_descriptor_file: bool,

    runner: R,
}

impl ProtocInvoker<SystemProtoc> {
    /// Create an invoker for the supplied configuration
    ///
    /// The protoc binary comes from `protoc_path`, `$PROTOC`, or `PATH`, in
    /// that order.
    ///
    /// # Example
    /// ```no_run
    /// use protoc_invoker::ProtocInvoker;
    /// use protoc_invoker_common::ProtoConfiguration;
    ///
    /// let config = ProtoConfiguration::new("proto").with_include_path("third_party");
    /// let invoker = ProtocInvoker::for_config(&config).unwrap();
    /// let descriptors = invoker.invoke_root().unwrap();
    /// println!("{} files", descriptors.file.len());
    /// ```
    pub fn for_config(config: &ProtoConfiguration) -> Result<Self> {
        let runner = SystemProtoc::resolve(config.protoc_path.as_deref());
        Self::with_runner(config, runner)
    }
}

impl<R: ProtocRunner> ProtocInvoker<R> {
    /// Create an invoker that launches protoc through `runner`
    ///
    /// Validation happens here: the root must be non-empty and exist, and
    /// every include path must exist. The first failure aborts construction.
    pub fn with_runner(config: &ProtoConfiguration, runner: R) -> Result<Self> {
        if config.root_directory.is_empty() {
            return Err(InvocationError::ConfigInvalid(
                "Proto root required".to_string(),
            ));
        }
        let proto_root = existing_absolute(&config.root_directory, "Proto root")?;

        let include_paths = config
            .include_paths
            .iter()
            .map(|include| existing_absolute(include, "Include path"))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            proto_root,
            include_paths,
            temp_dir: None,
            keep_descriptor_file: config.keep_descriptor_file,
            runner,
        })
    }

    /// Create descriptor files in `dir` instead of the platform temp dir
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn proto_root(&self) -> &Path {
        &self.proto_root
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// One `-I<dir>` flag per distinct include directory
    ///
    /// Directories that resolve to the same absolute path collapse into a
    /// single flag; the first occurrence keeps its position.
    pub fn include_path_args(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.include_paths
            .iter()
            .map(|include| format!("-I{}", include.display()))
            .filter(|arg| seen.insert(arg.clone()))
            .collect()
    }

    /// Full protoc argument list for compiling everything under `proto_files`
    ///
    /// Order: schema files, `-I` flags, `--descriptor_set_out`,
    /// `--include_imports`, `--proto_path`.
    pub fn protoc_args(&self, proto_files: &Path, descriptor_path: &Path) -> Result<Vec<String>> {
        let mut args: Vec<String> = scan_proto_files(proto_files)?.into_iter().collect();
        args.extend(self.include_path_args());
        args.push(format!("--descriptor_set_out={}", descriptor_path.display()));
        args.push("--include_imports".to_string());
        args.push(format!("--proto_path={}", self.proto_root.display()));
        Ok(args)
    }

    /// Compile every `.proto` file under `proto_files` and return the
    /// resulting descriptor set, imports included
    pub fn invoke(&self, proto_files: &Path) -> Result<FileDescriptorSet> {
        let temp_dir = self.temp_dir.clone().unwrap_or_else(env::temp_dir);
        let temp_failed = |source: std::io::Error| InvocationError::TempFileFailed {
            dir: temp_dir.clone(),
            source,
        };

        let temp_path = tempfile::Builder::new()
            .prefix(DESCRIPTOR_PREFIX)
            .suffix(DESCRIPTOR_SUFFIX)
            .tempfile_in(&temp_dir)
            .map_err(temp_failed)?
            .into_temp_path();

        // The guard removes the file on every exit path once dropped.
        let (descriptor_path, cleanup) = if self.keep_descriptor_file {
            (temp_path.keep().map_err(|e| temp_failed(e.error))?, None)
        } else {
            (temp_path.to_path_buf(), Some(temp_path))
        };
        let descriptor_path = path::absolute(&descriptor_path).map_err(temp_failed)?;
        if descriptor_path.to_str().is_none() {
            return Err(temp_failed(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("path is not valid UTF-8: {}", descriptor_path.display()),
            )));
        }

        let args = self.protoc_args(proto_files, &descriptor_path)?;
        self.invoke_binary(&args)?;

        let bytes =
            fs::read(&descriptor_path).map_err(|e| InvocationError::OutputUnreadable {
                path: descriptor_path.clone(),
                source: e,
            })?;
        let descriptor_set = FileDescriptorSet::decode(bytes.as_slice()).map_err(|e| {
            InvocationError::ParseFailed {
                path: descriptor_path.clone(),
                source: e,
            }
        })?;

        log::info!(
            "Loaded {} file descriptors from {}",
            descriptor_set.file.len(),
            descriptor_path.display()
        );
        drop(cleanup);
        Ok(descriptor_set)
    }

    /// [`invoke`](Self::invoke) against the configured proto root
    pub fn invoke_root(&self) -> Result<FileDescriptorSet> {
        self.invoke(&self.proto_root)
    }

    /// Invoke protoc and link the result into a reflection pool
    pub fn invoke_pool(&self, proto_files: &Path) -> Result<DescriptorPool> {
        let descriptor_set = self.invoke(proto_files)?;
        Ok(DescriptorPool::from_file_descriptor_set(descriptor_set)?)
    }

    fn invoke_binary(&self, args: &[String]) -> Result<()> {
        log::debug!("Running {} {}", self.runner.program(), args.join(" "));

        let status = self
            .runner
            .run(args)
            .map_err(|e| InvocationError::LaunchFailed {
                program: self.runner.program(),
                source: e,
            })?;

        if status != 0 {
            log::warn!("protoc exited with code {}", status);
            return Err(InvocationError::NonZeroExit {
                code: status,
                args: args.to_vec(),
            });
        }
        Ok(())
    }
}

fn existing_absolute(raw: &str, what: &str) -> Result<PathBuf> {
    let path = Path::new(raw);
    if !path.exists() {
        return Err(InvocationError::ConfigInvalid(format!(
            "{} does not exist: {}",
            what, raw
        )));
    }
    let absolute = path::absolute(path).map_err(|e| {
        InvocationError::ConfigInvalid(format!("{} {} cannot be made absolute: {}", what, raw, e))
    })?;
    // Drops trailing separators and `.` segments so equal directories compare equal.
    let normalized: PathBuf = absolute.components().collect();
    if normalized.to_str().is_none() {
        return Err(InvocationError::ConfigInvalid(format!(
            "{} is not valid UTF-8: {}",
            what,
            normalized.display()
        )));
    }
    Ok(normalized)
}
