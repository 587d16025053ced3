//! Session driver for ProCurve switches.
//!
//! [`ProcurveDriver`] owns one transport and runs every device query over
//! it: privilege detection and escalation, paging suppression, address and
//! neighbour lookups, trunk resolution and the end-to-end address trace.

mod builder;
mod ports;
mod privilege;
mod procurve;
mod response;
mod settings;
mod trace;

pub use builder::DriverBuilder;
pub use ports::{AggregatedPort, TrunkMember};
pub use privilege::{Privilege, PrivilegeTracker};
pub use procurve::ProcurveDriver;
pub use response::Response;
pub use settings::{DEFAULT_TIMEOUT, SessionSettings};
pub use trace::TraceResult;

use std::future::Future;

use crate::error::Result;

/// Trait for device drivers.
pub trait Driver: Send {
    /// Open the connection and determine the session's privilege level.
    fn open(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Close the connection. Closing a closed driver does nothing.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send a command and wait for the prompt.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Send multiple commands sequentially.
    fn send_commands(
        &mut self,
        commands: &[&str],
    ) -> impl Future<Output = Result<Vec<Response>>> + Send {
        async move {
            let mut responses = Vec::with_capacity(commands.len());
            for cmd in commands {
                responses.push(self.send_command(cmd).await?);
            }
            Ok(responses)
        }
    }

    /// Check if the driver is connected.
    fn is_open(&self) -> bool;

    /// Check if the underlying session is still alive.
    ///
    /// Returns `false` when not connected, or when the link was dropped
    /// by the peer or by a keepalive timeout.
    fn is_alive(&self) -> bool;

    /// Last privilege level observed on the device.
    fn current_privilege(&self) -> Privilege;
}
