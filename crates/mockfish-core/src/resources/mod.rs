//! Resource projection layer.
//!
//! Builds the typed Redfish documents served under [`SERVICE_ROOT`]. Static
//! inventory (systems, chassis, managers, roles, registries) is described by
//! [`ResourceKind`]; documents backed by live stores (accounts, sessions,
//! tasks, subscriptions) take their data as arguments.

pub mod account;
pub mod chassis;
pub mod manager;
pub mod registry;
pub mod service;
pub mod session;
pub mod system;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path prefix of every Redfish resource.
pub const SERVICE_ROOT: &str = "/redfish/v1";

/// Absolute resource path for a path relative to the service root.
pub fn odata_id(path: &str) -> String {
    format!("{SERVICE_ROOT}/{path}")
}

/// Reference to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
}

impl Link {
    pub fn new(odata_id: impl Into<String>) -> Self {
        Self {
            odata_id: odata_id.into(),
        }
    }

    /// Link to a path relative to the service root.
    pub fn to(path: &str) -> Self {
        Self::new(odata_id(path))
    }
}

/// Redfish health and message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Critical,
}

impl Health {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// Resource state and health.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    pub state: &'static str,
    pub health: Health,
}

impl Status {
    pub const fn enabled() -> Self {
        Self {
            state: "Enabled",
            health: Health::Ok,
        }
    }
}

/// Annotations and identity shared by every singular resource.
#[derive(Debug, Clone, Serialize)]
pub struct Header {
    #[serde(rename = "@odata.context")]
    pub odata_context: String,
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    #[serde(rename = "@odata.type")]
    pub odata_type: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Header {
    /// Header for a resource of `schema` at `odata_id`, typed as
    /// `#<schema>.<version>.<schema>`.
    pub fn new(
        schema: &str,
        version: &str,
        odata_id: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            odata_context: format!("{SERVICE_ROOT}/$metadata#{schema}.{schema}"),
            odata_id: odata_id.into(),
            odata_type: format!("#{schema}.{version}.{schema}"),
            id: id.into(),
            name: name.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A resource collection document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    #[serde(rename = "@odata.context")]
    pub odata_context: String,
    #[serde(rename = "@odata.id")]
    pub odata_id: String,
    #[serde(rename = "@odata.type")]
    pub odata_type: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Members")]
    pub members: Vec<Link>,
    #[serde(rename = "Members@odata.count")]
    pub count: usize,
}

impl Collection {
    /// Collection of `schema` (e.g. `ComputerSystemCollection`) at `path`.
    pub fn new(schema: &str, path: &str, name: impl Into<String>, members: Vec<Link>) -> Self {
        Self {
            odata_context: format!("{SERVICE_ROOT}/$metadata#{schema}.{schema}"),
            odata_id: odata_id(path),
            odata_type: format!("#{schema}.{schema}"),
            name: name.into(),
            count: members.len(),
            members,
        }
    }

    /// Replace the member list, keeping the count in step.
    pub fn set_members(&mut self, members: Vec<Link>) {
        self.count = members.len();
        self.members = members;
    }
}

/// A Redfish message, used in task logs and error details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub message_id: String,
    pub message: String,
    pub severity: Health,
    pub resolution: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub message_args: Vec<String>,
}

impl Message {
    pub fn new(
        message_id: impl Into<String>,
        message: impl Into<String>,
        severity: Health,
        resolution: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            message: message.into(),
            severity,
            resolution: resolution.into(),
            message_args: Vec::new(),
        }
    }

    /// Standard success message with a custom text.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new("Base.1.12.Success", message, Health::Ok, "No action required")
    }
}

/// Statically-populated resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    ComputerSystem,
    Chassis,
    Manager,
    Role,
    RegistryFile,
}

impl ResourceKind {
    pub const ALL: [Self; 5] = [
        Self::ComputerSystem,
        Self::Chassis,
        Self::Manager,
        Self::Role,
        Self::RegistryFile,
    ];

    /// Collection path relative to the service root.
    pub const fn collection_path(self) -> &'static str {
        match self {
            Self::ComputerSystem => "Systems",
            Self::Chassis => "Chassis",
            Self::Manager => "Managers",
            Self::Role => "AccountService/Roles",
            Self::RegistryFile => "Registries",
        }
    }

    /// Identifiers of every member.
    pub const fn member_ids(self) -> &'static [&'static str] {
        match self {
            Self::ComputerSystem | Self::Chassis | Self::Manager => &["1"],
            Self::Role => account::ROLE_IDS,
            Self::RegistryFile => registry::REGISTRY_IDS,
        }
    }

    pub fn contains(self, id: &str) -> bool {
        self.member_ids().contains(&id)
    }

    pub fn member_path(self, id: &str) -> String {
        format!("{}/{id}", self.collection_path())
    }

    /// The collection document listing every member.
    pub fn collection(self) -> Collection {
        let members = self
            .member_ids()
            .iter()
            .map(|id| Link::to(&self.member_path(id)))
            .collect();
        let (schema, name) = match self {
            Self::ComputerSystem => ("ComputerSystemCollection", "Computer System Collection"),
            Self::Chassis => ("ChassisCollection", "Chassis Collection"),
            Self::Manager => ("ManagerCollection", "Manager Collection"),
            Self::Role => ("RoleCollection", "Role Collection"),
            Self::RegistryFile => (
                "MessageRegistryFileCollection",
                "Message Registry File Collection",
            ),
        };
        Collection::new(schema, self.collection_path(), name, members)
    }

    /// Project member `id`, or `None` when no such member exists.
    pub fn project(self, id: &str) -> Option<Value> {
        if !self.contains(id) {
            return None;
        }
        let document = match self {
            Self::ComputerSystem => serde_json::to_value(system::computer_system(id)),
            Self::Chassis => serde_json::to_value(chassis::chassis(id)),
            Self::Manager => serde_json::to_value(manager::manager(id)),
            Self::Role => serde_json::to_value(account::role(id)?),
            Self::RegistryFile => serde_json::to_value(registry::registry_file(id)?),
        };
        document.ok()
    }

    /// Fields `$filter` may compare against.
    pub const fn filterable_fields(self) -> &'static [&'static str] {
        match self {
            Self::ComputerSystem => &["Id", "Name", "PowerState", "SystemType"],
            Self::Chassis => &["Id", "Name", "PowerState", "ChassisType"],
            Self::Manager => &["Id", "Name", "PowerState", "ManagerType"],
            Self::Role => &["Id", "Name", "RoleId", "IsPredefined"],
            Self::RegistryFile => &["Id", "Name", "Registry"],
        }
    }

    /// Relations under `Links` that `$expand` may inline.
    pub const fn expandable_relations(self) -> &'static [&'static str] {
        match self {
            Self::ComputerSystem => &["Chassis", "ManagedBy"],
            Self::Chassis => &["ComputerSystems", "ManagedBy"],
            Self::Manager => &["ManagerForServers", "ManagerForChassis"],
            Self::Role | Self::RegistryFile => &[],
        }
    }
}

/// Project the static resource at an absolute `@odata.id`.
pub fn resolve(uri: &str) -> Option<Value> {
    let path = uri.strip_prefix(SERVICE_ROOT)?.trim_matches('/');
    ResourceKind::ALL.into_iter().find_map(|kind| {
        let id = path
            .strip_prefix(kind.collection_path())?
            .strip_prefix('/')?;
        kind.project(id)
    })
}
