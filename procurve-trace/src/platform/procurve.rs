//! HP ProCurve / ArubaOS-Switch platform definition.
//!
//! # Prompt Examples
//!
//! ```text
//! HP-Switch-5406zl>                  # operator
//! HP-Switch-5406zl#                  # manager or superuser
//! HP-Switch-5406zl(config)#          # configuration context
//! ProCurve Switch 2810-24G#          # hostnames may contain spaces
//! ```
//!
//! The `#`/`>` prompt is not used for privilege detection: a Superuser
//! session and a Manager session look the same. The `show telnet` table
//! is the source of truth (see `driver::privilege`).

use super::PlatformDefinition;

/// Platform name for HP ProCurve.
pub const PLATFORM_NAME: &str = "hp_procurve";

/// Command vocabulary sent verbatim to the device.
pub mod commands {
    /// Session table flagging the current session and its privilege.
    pub const SHOW_TELNET: &str = "show telnet";

    /// Disable output paging for the session.
    pub const NO_PAGE: &str = "no page";

    /// Full MAC address table.
    pub const SHOW_MAC_ADDRESS: &str = "show mac-address";

    /// Firmware and boot information.
    pub const SHOW_VERSION: &str = "show version";

    /// Global LACP table.
    pub const SHOW_LACP: &str = "show lacp";

    /// Escalate from Operator to Manager.
    pub const ENABLE: &str = "enable";

    /// Lookup of one address, given in dash-grouped form.
    pub fn show_mac_address(dash_grouped: &str) -> String {
        format!("{SHOW_MAC_ADDRESS} {dash_grouped}")
    }

    /// Per-trunk LACP detail (16.x firmware).
    pub fn show_lacp_interfaces(trunk: &str) -> String {
        format!("{SHOW_LACP} interfaces {trunk}")
    }

    /// LLDP neighbour detail for one local port.
    pub fn show_lldp_remote_device(port: &str) -> String {
        format!("show lldp info remote-device {port}")
    }
}

/// Create the HP ProCurve platform definition.
pub fn platform() -> Result<PlatformDefinition, regex::Error> {
    let definition = PlatformDefinition::new(
        PLATFORM_NAME,
        r"(?m)^[\w.\-@/: ]{1,63}(?:\([\w.\-]+\))?[>#] ?\z",
    )?
    .with_continue_prompt(r"(?i)press any key to continue")?
    .with_credential_prompts(r"(?i)sername:\s*\z", r"(?i)assword:\s*\z")?
    .with_not_recognized("Invalid input")
    .with_failure_pattern("Ambiguous input")
    .with_failure_pattern("Incomplete input")
    .with_not_found_marker("not found")
    .with_aggregate_prefix("Trk")
    .with_active_member_state("Success")
    .with_active_member_state("Selected");

    Ok(definition)
}
