//! Error types for procurve-trace.

use std::time::Duration;

use thiserror::Error;

use crate::driver::Privilege;

/// Main error type for procurve-trace operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Device output could not be interpreted
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Malformed hardware address
    #[error("Address error: {0}")]
    Address(#[from] AddressError),
}

impl Error {
    /// Whether the link to the device is gone.
    ///
    /// Read timeouts count as a lost link: the output no longer lines up
    /// with the commands sent, so the driver closes the session. A connect
    /// timeout is a failed connection, not a lost one.
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            Error::Channel(ChannelError::Closed | ChannelError::PatternTimeout(_))
                | Error::Transport(TransportError::Disconnected)
        )
    }

    /// Whether this is a failed or inapplicable privilege escalation.
    pub fn is_escalation_failure(&self) -> bool {
        matches!(
            self,
            Error::Driver(
                DriverError::PrivilegeEscalationFailed { .. }
                    | DriverError::EscalationNotApplicable { .. }
            )
        )
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: russh::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host is not present in known_hosts (strict verification)
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (pattern matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Driver layer errors (session state, privilege escalation, port resolution).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Driver already connected
    #[error("Driver already connected")]
    AlreadyConnected,

    /// Invalid configuration in the driver builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The credential exchange completed but the device still reports a
    /// level below the one required
    #[error("Privilege escalation failed: device reports '{observed}'")]
    PrivilegeEscalationFailed { observed: Privilege },

    /// Escalation is not defined from the current level
    #[error("Privilege escalation not applicable from '{level}'")]
    EscalationNotApplicable { level: Privilege },

    /// A trunk has no member in the selected/active state
    #[error("No active members in aggregate port '{trunk}'")]
    NoActiveMembers { trunk: String },
}

/// Errors interpreting device output.
///
/// Empty results are not errors; these cover output that is present but
/// lacks something the caller cannot proceed without.
#[derive(Error, Debug)]
pub enum ParseError {
    /// `show telnet` listed no session flagged as the current one
    #[error("No active session row in device status output")]
    NoActiveSession,

    /// Privilege column held an unrecognized value
    #[error("Unknown privilege level '{value}'")]
    UnknownPrivilege { value: String },
}

/// Hardware address errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Not 12 hex digits after removing delimiters
    #[error("Invalid MAC address format: '{input}'")]
    InvalidFormat { input: String },
}

/// Result type alias using procurve-trace's Error.
pub type Result<T> = std::result::Result<T, Error>;
