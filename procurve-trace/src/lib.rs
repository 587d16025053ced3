//! # procurve-trace
//!
//! Async SSH session driver for HP ProCurve / ArubaOS-Switch devices that
//! traces a MAC address to the physical port it was learned on and the
//! LLDP neighbour behind that port.
//!
//! ## Features
//!
//! - Async SSH connections via russh
//! - Privilege detection from `show telnet` and `enable` escalation with
//!   verification
//! - Firmware-aware output parsing with TextFSM templates
//! - Trunk (LACP) resolution to active member ports
//! - MAC address normalization across notations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use procurve_trace::{Driver, DriverBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), procurve_trace::Error> {
//!     let mut driver = DriverBuilder::new("10.0.0.1")
//!         .username("manager")
//!         .password("secret")
//!         .build()?;
//!
//!     driver.open().await?;
//!
//!     let result = driver.trace_address("04:4b:ed:31:75:cd").await?;
//!     if result.found {
//!         println!("{} -> {}", result.local_port, result.next_device);
//!     }
//!
//!     driver.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod driver;
pub mod error;
pub mod mac;
pub mod model;
pub mod parser;
pub mod platform;
pub mod transport;

// Re-export main types for convenience
pub use driver::{
    AggregatedPort, Driver, DriverBuilder, Privilege, ProcurveDriver, Response, SessionSettings,
    TraceResult, TrunkMember,
};
pub use error::Error;
pub use mac::MacAddress;
pub use model::{DeviceVersion, MacTableEntry, NeighborRecord};
pub use parser::{OutputParser, Query, Record};
pub use platform::PlatformDefinition;
pub use transport::{AuthMethod, HostKeyVerification, SshConfig, SshTransport, Transport};
