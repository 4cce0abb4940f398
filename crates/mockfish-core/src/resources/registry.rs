//! Message registry documents.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Header, Health, odata_id};

pub const REGISTRY_IDS: &[&str] = &["Base.1.0.0", "Task.1.0.0"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageRegistryFile {
    #[serde(flatten)]
    pub header: Header,
    pub languages: Vec<&'static str>,
    pub registry: String,
    pub location: Vec<RegistryLocation>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegistryLocation {
    pub language: &'static str,
    pub uri: String,
    pub publication_uri: String,
}

/// Registry prefix and version (`Base.1.0.0` -> `Base`, `1.0.0`).
fn split_id(id: &str) -> Option<(&str, &str)> {
    id.split_once('.')
}

pub fn registry_file(id: &str) -> Option<MessageRegistryFile> {
    if !REGISTRY_IDS.contains(&id) {
        return None;
    }
    let (prefix, _) = split_id(id)?;
    Some(MessageRegistryFile {
        header: Header::new(
            "MessageRegistryFile",
            "v1_1_5",
            odata_id(&format!("Registries/{id}")),
            id,
            format!("{prefix} Message Registry File"),
        )
        .with_description(format!("{prefix} Message Registry File locations")),
        languages: vec!["en"],
        registry: id.to_string(),
        location: vec![RegistryLocation {
            language: "en",
            uri: odata_id(&format!("Registries/{id}.json")),
            publication_uri: format!(
                "https://www.dmtf.org/sites/default/files/standards/documents/DSP8011_{id}.json"
            ),
        }],
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageRegistry {
    #[serde(flatten)]
    pub header: Header,
    pub language: &'static str,
    pub registry_prefix: String,
    pub registry_version: String,
    pub messages: BTreeMap<&'static str, RegistryMessage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegistryMessage {
    pub description: &'static str,
    pub message: &'static str,
    pub number_of_args: usize,
    pub message_severity: Health,
    pub resolution: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub param_types: Vec<&'static str>,
}

const fn entry(
    description: &'static str,
    message: &'static str,
    number_of_args: usize,
    message_severity: Health,
    resolution: &'static str,
) -> RegistryMessage {
    RegistryMessage {
        description,
        message,
        number_of_args,
        message_severity,
        resolution,
        param_types: Vec::new(),
    }
}

/// Full registry content, served at the `Location` of [`registry_file`].
pub fn message_registry(id: &str) -> Option<MessageRegistry> {
    let (prefix, version) = split_id(id)?;
    let messages = match prefix {
        "Base" if REGISTRY_IDS.contains(&id) => base_messages(),
        "Task" if REGISTRY_IDS.contains(&id) => task_messages(),
        _ => return None,
    };
    Some(MessageRegistry {
        header: Header::new(
            "MessageRegistry",
            "v1_7_0",
            odata_id(&format!("Registries/{id}.json")),
            id,
            format!("{prefix} Message Registry"),
        ),
        language: "en",
        registry_prefix: prefix.to_string(),
        registry_version: version.to_string(),
        messages,
    })
}

fn base_messages() -> BTreeMap<&'static str, RegistryMessage> {
    let mut messages = BTreeMap::new();
    messages.insert(
        "Success",
        entry(
            "Indicates a successful operation",
            "Successfully Completed Request",
            0,
            Health::Ok,
            "No action required",
        ),
    );
    messages.insert(
        "InternalError",
        entry(
            "Indicates an internal error",
            "Internal Server Error",
            0,
            Health::Critical,
            "Contact system administrator",
        ),
    );
    let mut not_found = entry(
        "The requested resource was not found",
        "The requested resource %1 was not found",
        1,
        Health::Warning,
        "Check the URI and try again",
    );
    not_found.param_types = vec!["string"];
    messages.insert("ResourceNotFound", not_found);
    let mut not_in_list = entry(
        "The property value is not in the list of acceptable values",
        "The value %1 for the property %2 is not in the list of acceptable values",
        2,
        Health::Warning,
        "Choose a value from the enumeration list",
    );
    not_in_list.param_types = vec!["string", "string"];
    messages.insert("PropertyValueNotInList", not_in_list);
    messages
}

fn task_messages() -> BTreeMap<&'static str, RegistryMessage> {
    let mut messages = BTreeMap::new();
    for (key, description, message, severity) in [
        (
            "TaskStarted",
            "A task has started",
            "The task with Id '%1' has started.",
            Health::Ok,
        ),
        (
            "TaskProgressChanged",
            "A task has changed progress",
            "The task with Id '%1' has changed to progress %2 percent complete.",
            Health::Ok,
        ),
        (
            "TaskCompletedOK",
            "A task has completed",
            "The task with Id '%1' has completed.",
            Health::Ok,
        ),
        (
            "TaskAborted",
            "A task has completed with errors",
            "The task with Id '%1' has been aborted.",
            Health::Critical,
        ),
        (
            "TaskRemoved",
            "A task has been removed",
            "The task with Id '%1' has been removed.",
            Health::Warning,
        ),
    ] {
        let mut message = entry(description, message, 1, severity, "None.");
        message.param_types = vec!["string"];
        messages.insert(key, message);
    }
    messages
}
