//! Structured device data returned by the driver.

use serde::Serialize;

use crate::mac::MacAddress;
use crate::parser::Record;

/// One row of the forwarding (MAC address) table.
///
/// Fields the firmware does not report stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacTableEntry {
    pub mac: MacAddress,
    pub interface: String,
    pub vlan: Option<u16>,
    pub is_static: Option<bool>,
    pub active: Option<bool>,
    pub moves: Option<u32>,
    pub last_move: Option<f64>,
}

impl MacTableEntry {
    /// Build an entry from an address-table record.
    ///
    /// Returns `None` when the row has no parseable address or port.
    pub fn from_record(record: &Record) -> Option<Self> {
        let mac = record.get("mac")?.parse().ok()?;
        let interface = record.get("port")?.to_string();

        Some(Self {
            mac,
            interface,
            vlan: record.get("vlan").and_then(|v| v.parse().ok()),
            is_static: record
                .get("type")
                .map(|t| t.eq_ignore_ascii_case("static")),
            active: None,
            moves: None,
            last_move: None,
        })
    }
}

/// LLDP neighbour seen on one local port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NeighborRecord {
    pub local_port: String,
    pub remote_chassis_id: String,
    pub remote_chassis_id_type: String,
    pub remote_port: String,
    pub remote_port_type: String,
    pub remote_port_description: String,
    pub remote_system_name: String,
    pub remote_system_description: String,
    pub remote_system_capab: Vec<String>,
    pub remote_system_enable_capab: Vec<String>,
    pub remote_management_address: String,
}

impl NeighborRecord {
    /// Build a neighbour from a `show lldp info remote-device` record.
    pub fn from_record(record: &Record) -> Self {
        let field = |name: &str| record.get_or_empty(name).to_string();

        Self {
            local_port: field("local_port"),
            remote_chassis_id: field("chassis_id"),
            remote_chassis_id_type: field("chassis_type"),
            remote_port: field("port_id"),
            remote_port_type: field("port_type"),
            remote_port_description: field("port_descr"),
            remote_system_name: field("system_name"),
            remote_system_description: field("system_descr"),
            remote_system_capab: capabilities(record.get_or_empty("capabilities_supported")),
            remote_system_enable_capab: capabilities(record.get_or_empty("capabilities_enabled")),
            remote_management_address: field("management_address"),
        }
    }
}

fn capabilities(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Firmware information from `show version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceVersion {
    /// Firmware version, e.g. `K.15.18.0013`.
    pub os_version: String,
    pub image_stamp: String,
    pub boot_image: String,
}

impl DeviceVersion {
    pub fn from_record(record: &Record) -> Self {
        Self {
            os_version: record.get_or_empty("os_version").to_string(),
            image_stamp: record.get_or_empty("image_stamp").to_string(),
            boot_image: record.get_or_empty("boot_image").to_string(),
        }
    }
}
