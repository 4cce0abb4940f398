//! Management controller documents.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Header, Link, ResourceKind, Status, odata_id};
use crate::actions::{self, ActionDescriptor};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manager {
    #[serde(flatten)]
    pub header: Header,
    pub manager_type: &'static str,
    pub firmware_version: &'static str,
    pub status: Status,
    pub power_state: &'static str,
    pub service_identification: &'static str,
    #[serde(rename = "UUID")]
    pub uuid: &'static str,
    pub model: &'static str,
    pub date_time_local_offset: &'static str,
    pub network_protocol: Link,
    pub ethernet_interfaces: Link,
    pub log_services: Link,
    pub links: ManagerLinks,
    pub actions: BTreeMap<String, ActionDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerLinks {
    pub manager_for_servers: Vec<Link>,
    pub manager_for_chassis: Vec<Link>,
}

pub fn manager(id: &str) -> Manager {
    let path = ResourceKind::Manager.member_path(id);
    let uri = odata_id(&path);
    Manager {
        header: Header::new("Manager", "v1_20_0", uri.clone(), id, "Manager"),
        manager_type: "BMC",
        firmware_version: "1.0.0",
        status: Status::enabled(),
        power_state: "On",
        service_identification: "BMC",
        uuid: "00000000-0000-0000-0000-000000000001",
        model: "Baseboard Management Controller",
        date_time_local_offset: "+00:00",
        network_protocol: Link::to(&format!("{path}/NetworkProtocol")),
        ethernet_interfaces: Link::to(&format!("{path}/EthernetInterfaces")),
        log_services: Link::to(&format!("{path}/LogServices")),
        links: ManagerLinks {
            manager_for_servers: vec![Link::to(&ResourceKind::ComputerSystem.member_path("1"))],
            manager_for_chassis: vec![Link::to(&ResourceKind::Chassis.member_path("1"))],
        },
        actions: actions::descriptors(ResourceKind::Manager, &uri),
    }
}
