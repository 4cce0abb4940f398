//! Computer system documents.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;

use super::{Header, Link, ResourceKind, Status, odata_id};
use crate::actions::{self, ActionDescriptor};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
    #[serde(flatten)]
    pub header: Header,
    pub system_type: &'static str,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub serial_number: &'static str,
    #[serde(rename = "UUID")]
    pub uuid: &'static str,
    pub host_name: String,
    pub status: Status,
    pub power_state: &'static str,
    pub bios_version: &'static str,
    pub boot: Boot,
    pub processor_summary: ProcessorSummary,
    pub memory_summary: MemorySummary,
    pub processors: Link,
    pub memory: Link,
    pub ethernet_interfaces: Link,
    pub log_services: Link,
    pub links: SystemLinks,
    pub actions: BTreeMap<String, ActionDescriptor>,
    pub oem: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Boot {
    pub boot_source_override_enabled: &'static str,
    pub boot_source_override_target: &'static str,
    pub boot_source_override_mode: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessorSummary {
    pub count: u32,
    pub model: &'static str,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemorySummary {
    #[serde(rename = "TotalSystemMemoryGiB")]
    pub total_system_memory_gib: f64,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemLinks {
    pub chassis: Vec<Link>,
    pub managed_by: Vec<Link>,
}

pub fn computer_system(id: &str) -> ComputerSystem {
    let path = ResourceKind::ComputerSystem.member_path(id);
    let uri = odata_id(&path);
    ComputerSystem {
        header: Header::new(
            "ComputerSystem",
            "v1_20_0",
            uri.clone(),
            id,
            "Computer System",
        ),
        system_type: "Physical",
        manufacturer: "Contoso",
        model: "Contoso 1U Server",
        serial_number: "CN123456789",
        uuid: "00000000-0000-0000-0000-0000000000a1",
        host_name: format!("system-{id}"),
        status: Status::enabled(),
        power_state: "On",
        bios_version: "P79 v1.45",
        boot: Boot {
            boot_source_override_enabled: "Once",
            boot_source_override_target: "None",
            boot_source_override_mode: "UEFI",
        },
        processor_summary: ProcessorSummary {
            count: 1,
            model: "Contoso Xeon-class 16 core",
            status: Status::enabled(),
        },
        memory_summary: MemorySummary {
            total_system_memory_gib: 16.0,
            status: Status::enabled(),
        },
        processors: Link::to(&format!("{path}/Processors")),
        memory: Link::to(&format!("{path}/Memory")),
        ethernet_interfaces: Link::to(&format!("{path}/EthernetInterfaces")),
        log_services: Link::to(&format!("{path}/LogServices")),
        links: SystemLinks {
            chassis: vec![Link::to(&ResourceKind::Chassis.member_path("1"))],
            managed_by: vec![Link::to(&ResourceKind::Manager.member_path("1"))],
        },
        actions: actions::descriptors(ResourceKind::ComputerSystem, &uri),
        oem: contoso_oem(),
    }
}

fn contoso_oem() -> serde_json::Value {
    json!({
        "Contoso": {
            "VendorId": "CONTOSO",
            "ProductId": "SERVER-001",
            "SerialNumber": "CN123456789",
            "FirmwareVersion": "1.2.3",
            "CustomProperties": {
                "PowerEfficiency": 95.5,
                "TemperatureThreshold": 75,
                "CustomFeatureEnabled": true
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn system_document_shape() {
        let doc = serde_json::to_value(computer_system("1")).unwrap();
        assert_eq!(doc["@odata.id"], "/redfish/v1/Systems/1");
        assert_eq!(doc["@odata.type"], "#ComputerSystem.v1_20_0.ComputerSystem");
        assert_eq!(doc["PowerState"], "On");
        assert_eq!(doc["Status"]["Health"], "OK");
        assert_eq!(doc["MemorySummary"]["TotalSystemMemoryGiB"], 16.0);
        assert_eq!(
            doc["Links"]["ManagedBy"][0]["@odata.id"],
            "/redfish/v1/Managers/1"
        );
        assert_eq!(
            doc["Actions"]["#ComputerSystem.Reset"]["target"],
            "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset"
        );
        assert_eq!(doc["Oem"]["Contoso"]["VendorId"], "CONTOSO");
    }
}
