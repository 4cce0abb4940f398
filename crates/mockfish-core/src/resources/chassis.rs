//! Chassis documents.

use serde::Serialize;

use super::{Header, Link, ResourceKind, Status, odata_id};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Chassis {
    #[serde(flatten)]
    pub header: Header,
    pub chassis_type: &'static str,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub serial_number: &'static str,
    pub status: Status,
    pub power_state: &'static str,
    pub height_mm: f64,
    pub width_mm: f64,
    pub depth_mm: f64,
    pub weight_kg: f64,
    pub power: Link,
    pub thermal: Link,
    pub links: ChassisLinks,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChassisLinks {
    pub computer_systems: Vec<Link>,
    pub managed_by: Vec<Link>,
}

pub fn chassis(id: &str) -> Chassis {
    let path = ResourceKind::Chassis.member_path(id);
    Chassis {
        header: Header::new("Chassis", "v1_23_0", odata_id(&path), id, "Chassis"),
        chassis_type: "Rack",
        manufacturer: "Contoso",
        model: "Contoso 1U Enclosure",
        serial_number: "CH0000001",
        status: Status::enabled(),
        power_state: "On",
        height_mm: 44.0,
        width_mm: 482.6,
        depth_mm: 711.2,
        weight_kg: 15.0,
        power: Link::to(&format!("{path}/Power")),
        thermal: Link::to(&format!("{path}/Thermal")),
        links: ChassisLinks {
            computer_systems: vec![Link::to(&ResourceKind::ComputerSystem.member_path("1"))],
            managed_by: vec![Link::to(&ResourceKind::Manager.member_path("1"))],
        },
    }
}
