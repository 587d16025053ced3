//! End-to-end address trace.
//!
//! Given a MAC address, find the local port it was learned on and the LLDP
//! neighbour behind that port:
//!
//! 1. normalize the address (malformed input is "not found")
//! 2. escalate to Manager
//! 3. disable paging
//! 4. `show mac-address <xxxx-xxxx-xxxx>`
//! 5. record the port the address was learned on
//! 6. resolve a trunk port to its first active member
//! 7. `show lldp info remote-device <port>`
//!
//! Empty answers end the trace early with a partially filled result.
//! Escalation failures and lost links are errors.

use log::{debug, info, warn};
use serde::Serialize;

use super::procurve::ProcurveDriver;
use crate::error::{DriverError, Error, Result};
use crate::mac::MacAddress;
use crate::parser::Query;
use crate::platform::procurve::commands;
use crate::transport::Transport;

/// Outcome of [`ProcurveDriver::trace_address`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceResult {
    /// The address is in the forwarding table.
    pub found: bool,
    /// CDP lookups are not supported; always false.
    pub cdp_answer: bool,
    /// An LLDP neighbour was found on the local port.
    pub lldp_answer: bool,
    /// Physical port the address was learned on.
    pub local_port: String,
    /// Neighbour's port id.
    pub remote_port: String,
    /// Neighbour's system name.
    pub next_device: String,
    /// Neighbour's system description.
    pub next_device_descr: String,
}

impl<T: Transport> ProcurveDriver<T> {
    /// Trace `address` to a local port and the neighbour behind it.
    pub async fn trace_address(&mut self, address: &str) -> Result<TraceResult> {
        let mut result = TraceResult::default();

        let address: MacAddress = match address.parse() {
            Ok(address) => address,
            Err(e) => {
                warn!("{}: {}", self.settings.hostname, e);
                return Ok(result);
            }
        };

        self.escalate().await?;
        self.disable_paging().await?;

        let version = self.firmware().await?;
        let command = commands::show_mac_address(&address.to_dash_grouped());
        let response = self.execute(&command).await?;

        if self.platform.is_not_found(&response.result) {
            info!("{}: {} not found", self.settings.hostname, address);
            return Ok(result);
        }

        let rows = self
            .parser
            .parse(Query::MacLookup, &version, &response.result);
        let Some(port) = rows.first().and_then(|r| r.get("port")) else {
            info!("{}: {} not in address table", self.settings.hostname, address);
            return Ok(result);
        };

        result.found = true;
        result.local_port = port.to_string();
        debug!("{}: {} learned on {}", self.settings.hostname, address, port);

        if self.platform.is_aggregate(&result.local_port) {
            let trunk = result.local_port.clone();
            match self.resolve_aggregate(&trunk).await {
                Ok(members) => {
                    if let Some(member) = members.into_iter().next() {
                        debug!("{}: {} -> {}", self.settings.hostname, trunk, member);
                        result.local_port = member;
                    }
                }
                Err(Error::Driver(DriverError::NoActiveMembers { trunk })) => {
                    warn!(
                        "{}: {} has no active members, stopping at the trunk",
                        self.settings.hostname, trunk
                    );
                    return Ok(result);
                }
                Err(e) => return Err(e),
            }
        }

        let neighbors = self.get_neighbors_detail(&result.local_port).await?;
        if let Some(neighbor) = neighbors.into_iter().next() {
            result.lldp_answer = true;
            result.remote_port = neighbor.remote_port;
            result.next_device = neighbor.remote_system_name;
            result.next_device_descr = neighbor.remote_system_description;
        }

        info!(
            "{}: {} on {} -> {}",
            self.settings.hostname,
            address,
            result.local_port,
            if result.lldp_answer { result.next_device.as_str() } else { "(no neighbour)" }
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::procurve::tests::{VERSION_CLASSIC, driver, script_at, telnet};
    use crate::driver::{Driver, Privilege};
    use crate::transport::mock::MockScript;

    const LOOKUP_ON_TRUNK: &str = "
 Status and Counters - Address Table - 044bed-3175cd

  MAC Address : 044bed-3175cd
  Located on Port : Trk1";

    const SHOW_LACP_OUTPUT: &str = "
                           LACP

   PORT   LACP      TRUNK     PORT      LACP      LACP
   NUMB   ENABLED   GROUP     STATUS    PARTNER   STATUS
   ----   -------   -------   -------   -------   -------
   1/A2   Active    Trk1      Down      No        Failure
   1/A3   Active    Trk1      Up        Yes       Success
   1/A4   Active    Trk1      Up        Yes       Success";

    const LLDP_1A3: &str = "
 LLDP Remote Device Information Detail

  Local Port   : 1/A3
  ChassisType  : mac-address
  ChassisId    : 00 1b 3f 12 34 00
  PortType     : local
  PortId       : 49
  SysName      : core-sw-02
  System Descr : HP J9850A Switch 5406Rzl2, revision KB.16.10.0012
  PortDescr    : 49";

    /// Operator session that escalates, with paging and the trunk lookups.
    fn full_script() -> MockScript {
        let script = MockScript::new();
        script
            .reply("show version", VERSION_CLASSIC)
            .reply("show telnet", &telnet("Operator"))
            .reply("show telnet", &telnet("Manager"))
            .raw("enable", "\r\nUsername: ")
            .raw("admin", "\r\nPassword: ")
            .reply("s3cret", "")
            .reply("no page", "")
            .reply("show mac-address 044b-ed31-75cd", LOOKUP_ON_TRUNK)
            .reply("show lacp", SHOW_LACP_OUTPUT)
            .reply("show lldp info remote-device 1/A3", LLDP_1A3);
        script
    }

    #[tokio::test]
    async fn test_trace_through_trunk() {
        let script = full_script();
        let mut driver = driver(&script);
        driver.open().await.unwrap();

        let result = driver.trace_address("04:4b:ed:31:75:cd").await.unwrap();
        assert_eq!(
            result,
            TraceResult {
                found: true,
                cdp_answer: false,
                lldp_answer: true,
                local_port: "1/A3".to_string(),
                remote_port: "49".to_string(),
                next_device: "core-sw-02".to_string(),
                next_device_descr: "HP J9850A Switch 5406Rzl2, revision KB.16.10.0012"
                    .to_string(),
            }
        );
        assert_eq!(driver.current_privilege(), Privilege::Manager);
        assert_eq!(
            script.sent(),
            vec![
                "show version",
                "show telnet",
                "enable",
                "admin",
                "s3cret",
                "show telnet",
                "show telnet",
                "no page",
                "show mac-address 044b-ed31-75cd",
                "show lacp interfaces Trk1",
                "show lacp",
                "show lldp info remote-device 1/A3",
            ]
        );
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_trace_input_notations_agree() {
        for input in ["04-4b-ed-31-75-cd", "044bed3175cd", "044B.ED31.75CD"] {
            let script = full_script();
            let mut driver = driver(&script);
            driver.open().await.unwrap();

            let result = driver.trace_address(input).await.unwrap();
            if input.contains('.') {
                // Dots are not an accepted delimiter
                assert_eq!(result, TraceResult::default());
            } else {
                assert_eq!(result.local_port, "1/A3", "{input}");
            }
            driver.close().await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_trace_malformed_address() {
        let script = full_script();
        let mut driver = driver(&script);
        driver.open().await.unwrap();

        let result = driver.trace_address("04:4b:ed:31:75").await.unwrap();
        assert_eq!(result, TraceResult::default());
        // Nothing is sent to the device
        assert_eq!(script.count("enable"), 0);
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_trace_not_found() {
        let script = script_at("Manager");
        script.reply("no page", "").reply(
            "show mac-address 044b-ed31-75cd",
            "\r\n MAC address 044bed-3175cd not found.",
        );
        let mut driver = driver(&script);
        driver.open().await.unwrap();

        let result = driver.trace_address("044b-ed31-75cd").await.unwrap();
        assert_eq!(result, TraceResult::default());
        assert_eq!(script.count("show lldp info remote-device 1/A3"), 0);
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_trace_zero_rows_is_not_found() {
        let script = script_at("Manager");
        script
            .reply("no page", "")
            .reply("show mac-address 044b-ed31-75cd", "\r\n");
        let mut driver = driver(&script);
        driver.open().await.unwrap();

        let result = driver.trace_address("044b-ed31-75cd").await.unwrap();
        assert!(!result.found);
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_trace_physical_port_skips_resolution() {
        let script = script_at("Manager");
        script
            .reply("no page", "")
            .reply(
                "show mac-address 044b-ed31-75cd",
                "\r\n  MAC Address : 044bed-3175cd\r\n  Located on Port : 1/A3",
            )
            .reply("show lldp info remote-device 1/A3", LLDP_1A3);
        let mut driver = driver(&script);
        driver.open().await.unwrap();

        let result = driver.trace_address("044b-ed31-75cd").await.unwrap();
        assert!(result.found);
        assert_eq!(result.local_port, "1/A3");
        assert_eq!(result.next_device, "core-sw-02");
        assert_eq!(script.count("show lacp"), 0);
        assert_eq!(script.count("show lacp interfaces 1/A3"), 0);
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_trace_without_neighbour() {
        let script = script_at("Manager");
        script
            .reply("no page", "")
            .reply(
                "show mac-address 044b-ed31-75cd",
                "\r\n  Located on Port : 1/A7",
            )
            .reply("show lldp info remote-device 1/A7", "\r\n");
        let mut driver = driver(&script);
        driver.open().await.unwrap();

        let result = driver.trace_address("044b-ed31-75cd").await.unwrap();
        assert!(result.found);
        assert!(!result.lldp_answer);
        assert!(!result.cdp_answer);
        assert_eq!(result.local_port, "1/A7");
        assert_eq!(result.next_device, "");
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_trace_trunk_without_active_members() {
        let script = script_at("Manager");
        script
            .reply("no page", "")
            .reply("show mac-address 044b-ed31-75cd", LOOKUP_ON_TRUNK)
            .reply(
                "show lacp",
                "\r\n   1/A3   Active    Trk1      Down      No        Failure",
            );
        let mut driver = driver(&script);
        driver.open().await.unwrap();

        let result = driver.trace_address("044b-ed31-75cd").await.unwrap();
        assert!(result.found);
        assert_eq!(result.local_port, "Trk1");
        assert!(!result.lldp_answer);
        assert_eq!(script.count("show lldp info remote-device Trk1"), 0);
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_trace_escalation_failure_propagates() {
        let script = script_at("Operator");
        script
            .raw("enable", "\r\nUsername: ")
            .raw("admin", "\r\nPassword: ")
            .reply("s3cret", "");
        let mut driver = driver(&script);
        driver.open().await.unwrap();

        let err = driver.trace_address("044b-ed31-75cd").await.unwrap_err();
        assert!(err.is_escalation_failure());
        assert_eq!(script.count("no page"), 0);
        driver.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_trace_link_loss_propagates() {
        let script = script_at("Manager");
        let mut driver = driver(&script);
        driver.open().await.unwrap();
        script.drop_link();

        let err = driver.trace_address("044b-ed31-75cd").await.unwrap_err();
        assert!(err.is_connection_lost());
        driver.close().await.unwrap();
    }

    #[test]
    fn test_trace_result_serializes() {
        let json = serde_json::to_value(TraceResult::default()).unwrap();
        assert_eq!(json["found"], false);
        assert_eq!(json["next_device"], "");
    }
}
