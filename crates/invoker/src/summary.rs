//! Flat, printable view of a FileDescriptorSet

use prost_types::{DescriptorProto, FileDescriptorProto, FileDescriptorSet};
use serde::Serialize;

/// What a descriptor set contains, one entry per file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorSummary {
    pub files: Vec<FileSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    /// Path relative to the proto root, as protoc reports it
    pub name: String,
    pub package: Option<String>,
    pub dependencies: Vec<String>,
    /// Fully qualified, nested messages included
    pub messages: Vec<String>,
    pub enums: Vec<String>,
    pub services: Vec<ServiceSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSummary {
    pub name: String,
    pub methods: Vec<String>,
}

impl DescriptorSummary {
    pub fn from_set(set: &FileDescriptorSet) -> Self {
        Self {
            files: set.file.iter().map(FileSummary::from_file).collect(),
        }
    }

    pub fn message_count(&self) -> usize {
        self.files.iter().map(|f| f.messages.len()).sum()
    }

    pub fn service_count(&self) -> usize {
        self.files.iter().map(|f| f.services.len()).sum()
    }

    /// Whether a file with this name is part of the set
    pub fn contains_file(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }
}

impl FileSummary {
    fn from_file(file: &FileDescriptorProto) -> Self {
        let package = file.package.clone().filter(|p| !p.is_empty());
        let scope = package.clone().unwrap_or_default();

        let mut messages = Vec::new();
        let mut enums: Vec<String> = file
            .enum_type
            .iter()
            .map(|e| qualify(&scope, e.name()))
            .collect();
        for message in &file.message_type {
            collect_message(&scope, message, &mut messages, &mut enums);
        }

        let services = file
            .service
            .iter()
            .map(|service| ServiceSummary {
                name: qualify(&scope, service.name()),
                methods: service.method.iter().map(|m| m.name().to_string()).collect(),
            })
            .collect();

        Self {
            name: file.name().to_string(),
            package,
            dependencies: file.dependency.clone(),
            messages,
            enums,
            services,
        }
    }
}

fn collect_message(
    scope: &str,
    message: &DescriptorProto,
    messages: &mut Vec<String>,
    enums: &mut Vec<String>,
) {
    let full_name = qualify(scope, message.name());
    messages.push(full_name.clone());
    for nested in &message.enum_type {
        enums.push(qualify(&full_name, nested.name()));
    }
    for nested in &message.nested_type {
        // Synthesized map entry types are not worth listing.
        if nested.options.as_ref().and_then(|o| o.map_entry) == Some(true) {
            continue;
        }
        collect_message(&full_name, nested, messages, enums);
    }
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}
