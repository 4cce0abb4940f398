//! Action catalogue.
//!
//! Lists the actions each resource type supports, validates request
//! parameters against their allow-lists, and renders `ActionInfo` documents.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::resources::{Header, ResourceKind};

/// One action parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub required: bool,
    pub allowable_values: &'static [&'static str],
    /// Value used when an optional parameter is omitted.
    pub default: Option<&'static str>,
}

/// A supported action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec {
    /// Qualified name, e.g. `ComputerSystem.Reset`.
    pub name: &'static str,
    pub title: &'static str,
    pub parameters: &'static [ParameterSpec],
}

pub const COMPUTER_SYSTEM_RESET: ActionSpec = ActionSpec {
    name: "ComputerSystem.Reset",
    title: "Reset Computer System",
    parameters: &[ParameterSpec {
        name: "ResetType",
        required: false,
        allowable_values: &[
            "On",
            "ForceOff",
            "ForceRestart",
            "Nmi",
            "PushPowerButton",
            "GracefulRestart",
            "GracefulShutdown",
            "ForceOn",
        ],
        default: Some("On"),
    }],
};

pub const MANAGER_RESET: ActionSpec = ActionSpec {
    name: "Manager.Reset",
    title: "Reset Manager",
    parameters: &[ParameterSpec {
        name: "ResetType",
        required: false,
        allowable_values: &["ForceRestart", "GracefulRestart"],
        default: Some("GracefulRestart"),
    }],
};

/// Actions supported by a resource type.
pub const fn supported_actions(kind: ResourceKind) -> &'static [ActionSpec] {
    match kind {
        ResourceKind::ComputerSystem => &[COMPUTER_SYSTEM_RESET],
        ResourceKind::Manager => &[MANAGER_RESET],
        ResourceKind::Chassis | ResourceKind::Role | ResourceKind::RegistryFile => &[],
    }
}

pub fn find_action(kind: ResourceKind, name: &str) -> Option<&'static ActionSpec> {
    supported_actions(kind).iter().find(|a| a.name == name)
}

/// Parameter validation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("The value '{value}' for the parameter {name} is not in the list of acceptable values")]
    InvalidParameter { name: &'static str, value: String },

    #[error("The action requires the parameter {0} to be present")]
    MissingParameter(&'static str),
}

/// Validated parameter values, defaults filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionParameters(BTreeMap<&'static str, String>);

impl ActionParameters {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// JSON echo of the resolved parameters.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| ((*k).to_string(), Value::String(v.clone())))
                .collect(),
        )
    }
}

/// Action entry embedded in a resource's `Actions` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub target: String,
    pub title: &'static str,
    #[serde(rename = "@Redfish.ActionInfo")]
    pub action_info: String,
}

/// `Actions` object for a resource at `resource_uri`, keyed `#<Name>`.
pub fn descriptors(kind: ResourceKind, resource_uri: &str) -> BTreeMap<String, ActionDescriptor> {
    supported_actions(kind)
        .iter()
        .map(|action| {
            let target = action.target(resource_uri);
            (
                format!("#{}", action.name),
                ActionDescriptor {
                    action_info: target.clone(),
                    target,
                    title: action.title,
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionInfo {
    #[serde(flatten)]
    pub header: Header,
    pub parameters: Vec<ActionInfoParameter>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionInfoParameter {
    pub name: &'static str,
    pub required: bool,
    pub data_type: &'static str,
    pub allowable_values: &'static [&'static str],
}

impl ActionSpec {
    /// URI clients POST to.
    pub fn target(&self, resource_uri: &str) -> String {
        format!("{resource_uri}/Actions/{}", self.name)
    }

    /// Validate a request body. Unknown properties are ignored.
    pub fn validate(&self, body: &Map<String, Value>) -> Result<ActionParameters, ActionError> {
        let mut resolved = BTreeMap::new();
        for param in self.parameters {
            let value = match body.get(param.name) {
                None | Some(Value::Null) => match (param.required, param.default) {
                    (true, _) => return Err(ActionError::MissingParameter(param.name)),
                    (false, Some(default)) => default.to_string(),
                    (false, None) => continue,
                },
                Some(Value::String(s)) => s.clone(),
                Some(other) => {
                    return Err(ActionError::InvalidParameter {
                        name: param.name,
                        value: other.to_string(),
                    });
                }
            };
            if !param.allowable_values.is_empty()
                && !param.allowable_values.contains(&value.as_str())
            {
                return Err(ActionError::InvalidParameter {
                    name: param.name,
                    value,
                });
            }
            resolved.insert(param.name, value);
        }
        Ok(ActionParameters(resolved))
    }

    /// Self-description of this action on the resource at `resource_uri`.
    pub fn action_info(&self, resource_uri: &str) -> ActionInfo {
        let name = self.title.to_string();
        ActionInfo {
            header: Header::new(
                "ActionInfo",
                "v1_1_2",
                self.target(resource_uri),
                self.name,
                name,
            ),
            parameters: self
                .parameters
                .iter()
                .map(|p| ActionInfoParameter {
                    name: p.name,
                    required: p.required,
                    data_type: "String",
                    allowable_values: p.allowable_values,
                })
                .collect(),
        }
    }
}
