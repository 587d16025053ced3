//! Structured extraction of device output.
//!
//! Raw CLI text is turned into [`Record`]s with TextFSM templates
//! (`textfsm-rust`). Which template applies depends on the query and the
//! firmware family, see [`GrammarTable`].
//!
//! Zero records is a normal outcome ("address not found", "no neighbour")
//! and is how this module reports both empty output and output in a shape
//! the grammar does not recognize.

mod grammar;

use std::collections::HashMap;

use log::{debug, warn};
use textfsm_rust::Template;

pub use grammar::{FirmwareFamily, Grammar, GrammarTable, Query};

/// One row of extracted fields, keyed by lower-case field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record(HashMap<String, String>);

impl Record {
    /// Field value, or `None` if the field is absent or empty.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Field value, or an empty string.
    pub fn get_or_empty(&self, field: &str) -> &str {
        self.get(field).unwrap_or_default()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HashMap<String, String>> for Record {
    fn from(fields: HashMap<String, String>) -> Self {
        fields.into_iter().collect()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.as_ref().to_lowercase(), v.into()))
                .collect(),
        )
    }
}

/// Parses device output with the grammar selected for a query and version.
#[derive(Debug, Clone)]
pub struct OutputParser {
    table: GrammarTable,
}

impl OutputParser {
    /// Create a parser over a grammar table.
    pub fn new(table: GrammarTable) -> Self {
        Self { table }
    }

    /// The grammar table in use.
    pub fn table(&self) -> &GrammarTable {
        &self.table
    }

    /// Extract records from `raw`, the output of `query` on a device
    /// running firmware `version`.
    pub fn parse(&self, query: Query, version: &str, raw: &str) -> Vec<Record> {
        let Some(grammar) = self.table.select(query, version) else {
            warn!("no grammar registered for {:?}", query);
            return Vec::new();
        };

        match extract(grammar, raw) {
            Ok(records) => {
                debug!("{}: {} record(s)", grammar.name, records.len());
                records
            }
            Err(message) => {
                warn!("{}: extraction failed: {}", grammar.name, message);
                Vec::new()
            }
        }
    }
}

impl Default for OutputParser {
    fn default() -> Self {
        Self::new(GrammarTable::procurve())
    }
}

fn extract(grammar: &Grammar, raw: &str) -> Result<Vec<Record>, String> {
    let template = Template::parse_str(grammar.source).map_err(|e| e.to_string())?;
    let mut parser = template.parser();
    let rows = parser
        .parse_text_to_dicts(raw)
        .map_err(|e| e.to_string())?;
    Ok(rows.into_iter().map(Record::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIC: &str = "K.15.18.0013";
    const ARUBAOS: &str = "WC.16.10.0012";

    fn parse(query: Query, version: &str, raw: &str) -> Vec<Record> {
        OutputParser::default().parse(query, version, raw)
    }

    #[test]
    fn test_record_field_access() {
        let record: Record = [("PORT", "Trk1"), ("VLAN", " ")].into_iter().collect();
        assert_eq!(record.get("port"), Some("Trk1"));
        assert_eq!(record.get("vlan"), None);
        assert_eq!(record.get_or_empty("missing"), "");
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_show_telnet_classic() {
        let raw = "
 Telnet Activity

  Session Privilege From            To
  ------- --------- --------------- ---------------
        1 Superuser Console
    **  2 Operator  192.168.1.10
";
        let records = parse(Query::DeviceStatus, CLASSIC, raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("active"), None);
        assert_eq!(records[0].get("user_level"), Some("Superuser"));
        assert_eq!(records[1].get("active"), Some("**"));
        assert_eq!(records[1].get("session"), Some("2"));
        assert_eq!(records[1].get("user_level"), Some("Operator"));
        assert_eq!(records[1].get("from"), Some("192.168.1.10"));
    }

    #[test]
    fn test_show_telnet_arubaos() {
        let raw = "
 Telnet Activity

  Session  : 1
  Privilege: Superuser
  From     : Console
  To       :

  Session  : ** 2
  Privilege: Manager
  From     : 192.168.1.10
  To       :
";
        let records = parse(Query::DeviceStatus, ARUBAOS, raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("active"), Some("**"));
        assert_eq!(records[1].get("user_level"), Some("Manager"));
    }

    #[test]
    fn test_show_version() {
        let raw = "
Image stamp:    /ws/swbuildm/rel_ukiah_qaoff/code/build/bom(swbuildm_rel_ukiah_qaoff_rel_ukiah)
                Mon Jun 10 10:47:46 UTC 2019
                WC.16.09.0002
                Ukiah
                1138
Boot Image:     Primary
";
        // Version grammar is shared by both families
        let records = parse(Query::Version, "", raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("os_version"), Some("WC.16.09.0002"));
        assert_eq!(records[0].get("boot_image"), Some("Primary"));
    }

    #[test]
    fn test_show_mac_address_table() {
        let raw = "
 Status and Counters - Port Address Table

  MAC Address   Port   VLAN
  ------------- ------ ----
  001560-b3e3c0 Trk1   1
  044bed-3175cd 1/A3   20
";
        let records = parse(Query::MacTable, CLASSIC, raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("mac"), Some("001560-b3e3c0"));
        assert_eq!(records[1].get("port"), Some("1/A3"));
        assert_eq!(records[1].get("vlan"), Some("20"));
        assert_eq!(records[1].get("type"), None);
    }

    #[test]
    fn test_show_mac_address_table_arubaos() {
        let raw = "
 Status and Counters - Port Address Table

  MAC Address   Port   VLAN Type
  ------------- ------ ---- -------
  001560-b3e3c0 Trk1   1    dynamic
  044bed-3175cd 1/A3   20   static
";
        let records = parse(Query::MacTable, ARUBAOS, raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("type"), Some("static"));
    }

    #[test]
    fn test_mac_lookup() {
        let classic = "
 Status and Counters - Address Table - 044bed-3175cd

  MAC Address : 044bed-3175cd
  Located on Port : Trk1
";
        let records = parse(Query::MacLookup, CLASSIC, classic);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("port"), Some("Trk1"));

        let arubaos = "
 Status and Counters - Address Table - 044bed-3175cd

  Port            VLAN
  --------------- ----
  Trk1            1
";
        let records = parse(Query::MacLookup, ARUBAOS, arubaos);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("port"), Some("Trk1"));
        assert_eq!(records[0].get("vlan"), Some("1"));
    }

    #[test]
    fn test_mac_lookup_not_found_yields_no_rows() {
        let raw = "MAC address 044bed-3175cd not found.";
        assert!(parse(Query::MacLookup, CLASSIC, raw).is_empty());
        assert!(parse(Query::MacLookup, ARUBAOS, raw).is_empty());
    }

    #[test]
    fn test_show_lacp() {
        let raw = "
                           LACP

   PORT   LACP      TRUNK     PORT      LACP      LACP
   NUMB   ENABLED   GROUP     STATUS    PARTNER   STATUS
   ----   -------   -------   -------   -------   -------
   1/A3   Active    Trk1      Up        Yes       Success
   1/A4   Active    Trk1      Down      No        Failure
   A5     Passive   A5        Up        No        Success
";
        let records = parse(Query::LinkAggregation, CLASSIC, raw);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("port"), Some("1/A3"));
        assert_eq!(records[0].get("trunk"), Some("Trk1"));
        assert_eq!(records[0].get("status"), Some("Success"));
        assert_eq!(records[1].get("status"), Some("Failure"));
    }

    #[test]
    fn test_show_lacp_interfaces_arubaos() {
        let raw = "
 LACP Trunk Trk1 Detail

  Port   Trunk  Status    Partner  LACP Mode
  ------ ------ --------- -------- ---------
  1/A3   Trk1   Selected  Yes      Active
  1/A4   Trk1   Standby   Yes      Active
";
        let records = parse(Query::LinkAggregation, ARUBAOS, raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("status"), Some("Selected"));
        assert_eq!(records[1].get("port"), Some("1/A4"));
    }

    #[test]
    fn test_lldp_remote_device_classic() {
        let raw = "
 LLDP Remote Device Information Detail

  Local Port   : 1/A3
  ChassisType  : mac-address
  ChassisId    : 00 1b 3f 12 34 00
  PortType     : local
  PortId       : 49
  SysName      : core-sw-02
  System Descr : HP J9850A Switch 5406Rzl2, revision KB.16.10.0012
  PortDescr    : 49

  System Capabilities Supported  : bridge, router
  System Capabilities Enabled    : bridge, router

  Remote Management Address
     Type    : ipv4
     Address : 10.0.0.2
";
        let records = parse(Query::NeighborDetail, CLASSIC, raw);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.get("local_port"), Some("1/A3"));
        assert_eq!(r.get("chassis_id"), Some("00 1b 3f 12 34 00"));
        assert_eq!(r.get("system_name"), Some("core-sw-02"));
        assert_eq!(
            r.get("system_descr"),
            Some("HP J9850A Switch 5406Rzl2, revision KB.16.10.0012")
        );
        assert_eq!(r.get("capabilities_enabled"), Some("bridge, router"));
        assert_eq!(r.get("management_address"), Some("10.0.0.2"));
    }

    #[test]
    fn test_lldp_remote_device_arubaos_two_neighbors() {
        let raw = "
 LLDP Remote Device Information Detail

  Local Port   : 1/A3
  Chassis Type : mac-address
  Chassis Id   : 001b3f-123400
  Port Type    : local
  Port Id      : 49
  System Name  : core-sw-02
  System Descr : Aruba JL322A 2930M-48G
  Port Descr   : 49

  Local Port   : 1/A3
  Chassis Type : mac-address
  Chassis Id   : 3c4a92-aa0011
  Port Type    : mac-address
  Port Id      : 3c4a92-aa0011
  System Name  : phone-204
";
        let records = parse(Query::NeighborDetail, ARUBAOS, raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("system_name"), Some("core-sw-02"));
        assert_eq!(records[0].get("system_descr"), Some("Aruba JL322A 2930M-48G"));
        assert_eq!(records[1].get("system_name"), Some("phone-204"));
        assert_eq!(records[1].get("system_descr"), None);
    }

    #[test]
    fn test_unrecognized_output_yields_no_rows() {
        assert!(parse(Query::NeighborDetail, CLASSIC, "Invalid input: remote-device").is_empty());
        assert!(parse(Query::DeviceStatus, CLASSIC, "").is_empty());
    }
}
