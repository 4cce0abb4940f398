//! Service-level documents: service root, OData service document, metadata,
//! and the session/task/event service singletons.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Header, Link, SERVICE_ROOT, Status, odata_id};

pub const REDFISH_VERSION: &str = "1.15.0";

/// The CSDL metadata document.
pub const METADATA_XML: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx Version="4.0" xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx">
  <edmx:DataServices>
    <Schema Namespace="Service" xmlns="http://docs.oasis-open.org/odata/ns/edm">
      <EntityType Name="ServiceRoot">
        <Key>
          <PropertyRef Name="Id" />
        </Key>
        <Property Name="Id" Type="Edm.String" Nullable="false" />
        <Property Name="Name" Type="Edm.String" Nullable="false" />
        <Property Name="RedfishVersion" Type="Edm.String" Nullable="false" />
      </EntityType>
      <EntityContainer Name="Service">
        <EntitySet Name="ServiceRoot" EntityType="Service.ServiceRoot" />
        <EntitySet Name="Systems" EntityType="ComputerSystemCollection.ComputerSystemCollection" />
        <EntitySet Name="Chassis" EntityType="ChassisCollection.ChassisCollection" />
        <EntitySet Name="Managers" EntityType="ManagerCollection.ManagerCollection" />
        <EntitySet Name="TaskService" EntityType="TaskService.TaskService" />
        <EntitySet Name="SessionService" EntityType="SessionService.SessionService" />
        <EntitySet Name="AccountService" EntityType="AccountService.AccountService" />
        <EntitySet Name="EventService" EntityType="EventService.EventService" />
        <EntitySet Name="Registries" EntityType="MessageRegistryFileCollection.MessageRegistryFileCollection" />
      </EntityContainer>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>
"#;

/// A minimal OpenAPI description of the service.
pub const OPENAPI_YAML: &str = r"openapi: 3.0.0
info:
  title: mockfish Redfish API
  version: 1.0.0
  description: Redfish-style management API
paths:
  /redfish/v1/:
    get:
      summary: Get service root
      responses:
        '200':
          description: OK
  /redfish/v1/SessionService/Sessions:
    post:
      summary: Create a session
      responses:
        '201':
          description: Created
        '401':
          description: Unauthorized
  /redfish/v1/Systems/{id}/Actions/ComputerSystem.Reset:
    post:
      summary: Reset a computer system
      responses:
        '202':
          description: Accepted, task created
";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRoot {
    #[serde(flatten)]
    pub header: Header,
    pub redfish_version: &'static str,
    #[serde(rename = "UUID")]
    pub uuid: &'static str,
    pub systems: Link,
    pub chassis: Link,
    pub managers: Link,
    pub tasks: Link,
    pub session_service: Link,
    pub account_service: Link,
    pub event_service: Link,
    pub registries: Link,
    pub links: ServiceRootLinks,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRootLinks {
    pub sessions: Link,
}

pub fn service_root() -> ServiceRoot {
    ServiceRoot {
        header: Header::new(
            "ServiceRoot",
            "v1_15_0",
            format!("{SERVICE_ROOT}/"),
            "RootService",
            "Root Service",
        ),
        redfish_version: REDFISH_VERSION,
        uuid: "00000000-0000-0000-0000-000000000000",
        systems: Link::to("Systems"),
        chassis: Link::to("Chassis"),
        managers: Link::to("Managers"),
        tasks: Link::to("TaskService"),
        session_service: Link::to("SessionService"),
        account_service: Link::to("AccountService"),
        event_service: Link::to("EventService"),
        registries: Link::to("Registries"),
        links: ServiceRootLinks {
            sessions: Link::to("SessionService/Sessions"),
        },
    }
}

/// The `/redfish` version map.
pub fn protocol_versions() -> BTreeMap<&'static str, String> {
    BTreeMap::from([("v1", format!("{SERVICE_ROOT}/"))])
}

#[derive(Debug, Clone, Serialize)]
pub struct ODataServiceDocument {
    #[serde(rename = "@odata.context")]
    pub odata_context: String,
    pub value: Vec<ODataEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ODataEntry {
    pub name: &'static str,
    pub kind: &'static str,
    pub url: String,
}

pub fn odata_service_document() -> ODataServiceDocument {
    let singleton = |name: &'static str, path: &str| ODataEntry {
        name,
        kind: "Singleton",
        url: odata_id(path),
    };
    ODataServiceDocument {
        odata_context: format!("{SERVICE_ROOT}/$metadata"),
        value: vec![
            ODataEntry {
                name: "Service",
                kind: "Singleton",
                url: format!("{SERVICE_ROOT}/"),
            },
            singleton("Systems", "Systems"),
            singleton("Chassis", "Chassis"),
            singleton("Managers", "Managers"),
            singleton("TaskService", "TaskService"),
            singleton("SessionService", "SessionService"),
            singleton("AccountService", "AccountService"),
            singleton("EventService", "EventService"),
            singleton("Registries", "Registries"),
        ],
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionService {
    #[serde(flatten)]
    pub header: Header,
    pub status: Status,
    pub service_enabled: bool,
    pub session_timeout: u64,
    pub sessions: Link,
}

pub fn session_service(session_timeout_secs: u64) -> SessionService {
    SessionService {
        header: Header::new(
            "SessionService",
            "v1_1_8",
            odata_id("SessionService"),
            "SessionService",
            "Session Service",
        ),
        status: Status::enabled(),
        service_enabled: true,
        session_timeout: session_timeout_secs,
        sessions: Link::to("SessionService/Sessions"),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskService {
    #[serde(flatten)]
    pub header: Header,
    pub service_enabled: bool,
    pub completed_task_over_write_policy: &'static str,
    pub date_time: String,
    pub life_cycle_event_on_task_state_change: bool,
    pub task_auto_delete_timeout_minutes: u64,
    pub status: Status,
    pub tasks: Link,
}

pub fn task_service(date_time: String, auto_delete_minutes: u64) -> TaskService {
    TaskService {
        header: Header::new(
            "TaskService",
            "v1_2_1",
            odata_id("TaskService"),
            "TaskService",
            "Task Service",
        ),
        service_enabled: true,
        completed_task_over_write_policy: "Manual",
        date_time,
        life_cycle_event_on_task_state_change: true,
        task_auto_delete_timeout_minutes: auto_delete_minutes,
        status: Status::enabled(),
        tasks: Link::to("TaskService/Tasks"),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventService {
    #[serde(flatten)]
    pub header: Header,
    pub service_enabled: bool,
    pub delivery_retry_attempts: u32,
    pub delivery_retry_interval_seconds: u32,
    pub event_format_types: &'static [&'static str],
    pub include_origin_of_condition_supported: bool,
    pub registry_prefixes: &'static [&'static str],
    pub resource_types: &'static [&'static str],
    pub server_sent_event_uri: String,
    pub severities: &'static [&'static str],
    pub status: Status,
    pub subscriptions: Link,
}

pub fn event_service() -> EventService {
    EventService {
        header: Header::new(
            "EventService",
            "v1_11_0",
            odata_id("EventService"),
            "EventService",
            "Event Service",
        ),
        service_enabled: true,
        delivery_retry_attempts: 3,
        delivery_retry_interval_seconds: 60,
        event_format_types: &["Event"],
        include_origin_of_condition_supported: true,
        registry_prefixes: &["Base", "Task", "TaskEvent"],
        resource_types: &["ComputerSystem", "Manager", "Chassis", "Task"],
        server_sent_event_uri: odata_id("EventService/SSE"),
        severities: &["OK", "Warning", "Critical"],
        status: Status::enabled(),
        subscriptions: Link::to("EventService/Subscriptions"),
    }
}
