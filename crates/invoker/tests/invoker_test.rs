//! Integration tests for the protoc invoker

use prost::Message;
use prost_types::{FileDescriptorProto, FileDescriptorSet};
use protoc_invoker::{
    DescriptorSummary, InvocationError, ProtoConfiguration, ProtocInvoker, ProtocRunner,
};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{self, Path, PathBuf};
use tempfile::TempDir;

/// Stands in for protoc: records every argument list and writes a
/// descriptor set naming each input file plus one import
struct FakeProtoc {
    calls: RefCell<Vec<Vec<String>>>,
    exit_code: i32,
}

impl FakeProtoc {
    fn exiting_with(exit_code: i32) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            exit_code,
        }
    }
}

impl ProtocRunner for FakeProtoc {
    fn program(&self) -> String {
        "fake-protoc".to_string()
    }

    fn run(&self, args: &[String]) -> io::Result<i32> {
        self.calls.borrow_mut().push(args.to_vec());
        if self.exit_code != 0 {
            return Ok(self.exit_code);
        }

        let root = args
            .iter()
            .find_map(|a| a.strip_prefix("--proto_path="))
            .map(PathBuf::from)
            .expect("proto_path");
        let out = args
            .iter()
            .find_map(|a| a.strip_prefix("--descriptor_set_out="))
            .expect("descriptor_set_out");

        let mut file: Vec<FileDescriptorProto> = args
            .iter()
            .filter(|a| !a.starts_with('-'))
            .map(|a| FileDescriptorProto {
                name: Path::new(a)
                    .strip_prefix(&root)
                    .ok()
                    .map(|p| p.display().to_string()),
                ..Default::default()
            })
            .collect();
        file.push(FileDescriptorProto {
            name: Some("google/protobuf/timestamp.proto".to_string()),
            ..Default::default()
        });

        fs::write(out, FileDescriptorSet { file }.encode_to_vec())?;
        Ok(0)
    }
}

fn proto_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    for relative in ["a/x.proto", "a/b/y.proto", "c.txt"] {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }
    dir
}

#[test]
fn test_invoke_returns_scanned_files_and_imports() {
    let dir = proto_tree();
    let config = ProtoConfiguration::new(dir.path().display().to_string());
    let invoker = ProtocInvoker::with_runner(&config, FakeProtoc::exiting_with(0)).unwrap();

    let set = invoker.invoke_root().unwrap();
    let summary = DescriptorSummary::from_set(&set);

    assert!(summary.contains_file("a/x.proto"));
    assert!(summary.contains_file("a/b/y.proto"));
    assert!(summary.contains_file("google/protobuf/timestamp.proto"));
    assert!(!summary.files.iter().any(|f| f.name.ends_with("c.txt")));
}

#[test]
fn test_each_invocation_gets_its_own_descriptor_file() {
    let dir = proto_tree();
    let temp = TempDir::new().unwrap();
    let config = ProtoConfiguration::new(dir.path().display().to_string());
    let invoker = ProtocInvoker::with_runner(&config, FakeProtoc::exiting_with(0))
        .unwrap()
        .with_temp_dir(temp.path());

    invoker.invoke_root().unwrap();
    invoker.invoke_root().unwrap();

    let calls = invoker.runner().calls.borrow();
    assert_eq!(calls.len(), 2);
    let out_flag = |args: &Vec<String>| {
        args.iter()
            .find(|a| a.starts_with("--descriptor_set_out="))
            .cloned()
            .unwrap()
    };
    assert_ne!(out_flag(&calls[0]), out_flag(&calls[1]));
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 2);
}

#[test]
fn test_invoke_subtree_keeps_configured_proto_path() {
    let dir = proto_tree();
    let config = ProtoConfiguration::new(dir.path().display().to_string());
    let invoker = ProtocInvoker::with_runner(&config, FakeProtoc::exiting_with(0)).unwrap();

    let set = invoker.invoke(&dir.path().join("a/b")).unwrap();
    let names: Vec<_> = set.file.iter().filter_map(|f| f.name.as_deref()).collect();
    assert_eq!(names, vec!["a/b/y.proto", "google/protobuf/timestamp.proto"]);

    let calls = invoker.runner().calls.borrow();
    let root = path::absolute(dir.path()).unwrap();
    assert!(calls[0].contains(&format!("--proto_path={}", root.display())));
}

#[test]
fn test_non_zero_exit_surfaces_code() {
    let dir = proto_tree();
    let config = ProtoConfiguration::new(dir.path().display().to_string());
    let invoker = ProtocInvoker::with_runner(&config, FakeProtoc::exiting_with(42)).unwrap();

    let err = invoker.invoke_root().unwrap_err();
    assert!(matches!(err, InvocationError::NonZeroExit { code: 42, .. }));
    assert!(err.to_string().contains("[42]"));
    assert!(err.to_string().contains("--include_imports"));
}

#[test]
fn test_bad_configuration_never_launches() {
    let dir = proto_tree();
    let config = ProtoConfiguration::new(dir.path().display().to_string())
        .with_include_path(dir.path().join("missing").display().to_string());

    let result = ProtocInvoker::with_runner(&config, FakeProtoc::exiting_with(0));
    assert!(matches!(result, Err(InvocationError::ConfigInvalid(_))));
}

/// Runs the real compiler; needs protoc on PATH or in $PROTOC
#[test]
#[ignore]
fn test_real_protoc_compiles_tree() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("demo")).unwrap();
    fs::write(
        dir.path().join("demo/ping.proto"),
        r#"syntax = "proto3";
package demo;
import "google/protobuf/timestamp.proto";
message Ping { google.protobuf.Timestamp sent_at = 1; }
service Pinger { rpc Send(Ping) returns (Ping); }
"#,
    )
    .unwrap();

    let config = ProtoConfiguration::new(dir.path().display().to_string())
        .with_keep_descriptor_file(false);
    let invoker = ProtocInvoker::for_config(&config).unwrap();

    let pool = invoker.invoke_pool(dir.path()).unwrap();
    assert!(pool.get_message_by_name("demo.Ping").is_some());
    assert!(pool.get_service_by_name("demo.Pinger").is_some());
    assert!(pool.get_file_by_name("google/protobuf/timestamp.proto").is_some());
}
