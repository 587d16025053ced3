//! Per-session device identity and behaviour switches.

use std::time::Duration;

use secrecy::SecretString;

/// Default read timeout for every command.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Device identity and escalation credentials for one session.
///
/// Read-only once the driver is built.
#[derive(Debug)]
pub struct SessionSettings {
    /// Device name used in log lines.
    pub hostname: String,

    /// Username sent at the `enable` username prompt.
    pub username: String,

    /// Secret sent at the `enable` password prompt.
    pub secret: SecretString,

    /// Read timeout applied to every prompt wait.
    pub timeout: Duration,

    /// Treat `Superuser` as sufficient instead of requiring `Manager`.
    pub accept_superuser: bool,
}

impl SessionSettings {
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            secret: SecretString::from(secret.into()),
            timeout: DEFAULT_TIMEOUT,
            accept_superuser: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_accept_superuser(mut self, accept: bool) -> Self {
        self.accept_superuser = accept;
        self
    }
}
