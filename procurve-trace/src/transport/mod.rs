//! Transport layer.
//!
//! [`Transport`] is the seam between the session driver and the byte
//! stream to the device. [`SshTransport`] implements it over russh; the
//! driver is generic over it so sessions can also run over scripted
//! transports.

pub mod config;
#[cfg(test)]
pub(crate) mod mock;
mod ssh;

use std::future::Future;
use std::time::Duration;

use regex::bytes::Regex;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use ssh::SshTransport;

use crate::error::Result;

/// An interactive, line-oriented connection to one device.
pub trait Transport: Send + Sized {
    /// Connection parameters.
    type Config: Send + Sync;

    /// Establish the connection and start an interactive shell.
    fn connect(config: &Self::Config) -> impl Future<Output = Result<Self>> + Send;

    /// Send `input` followed by a newline.
    fn write(&mut self, input: &str) -> impl Future<Output = Result<()>> + Send;

    /// Read until `pattern` matches, returning the text read so far
    /// (including the match).
    ///
    /// Fails with a channel timeout if the pattern does not appear within
    /// `timeout`, or with a closed-channel error if the link goes away.
    fn read_until(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Tear the connection down.
    fn close(self) -> impl Future<Output = Result<()>> + Send;

    /// Whether the connection is still usable.
    fn is_alive(&self) -> bool;
}
