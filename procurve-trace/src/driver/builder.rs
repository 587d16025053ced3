//! Builder for ProCurve drivers over SSH.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use super::procurve::ProcurveDriver;
use super::settings::{DEFAULT_TIMEOUT, SessionSettings};
use crate::channel::PtyConfig;
use crate::error::{DriverError, Result};
use crate::transport::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::transport::SshTransport;

/// Default interval between SSH keepalives.
pub const DEFAULT_KEEPALIVE: Duration = Duration::from_secs(30);

/// Builder for [`ProcurveDriver`] over SSH.
///
/// # Example
///
/// ```rust,no_run
/// use procurve_trace::{Driver, DriverBuilder};
///
/// # async fn example() -> Result<(), procurve_trace::Error> {
/// let mut driver = DriverBuilder::new("10.0.0.1")
///     .username("manager")
///     .password("secret")
///     .build()?;
///
/// driver.open().await?;
/// let result = driver.trace_address("04:4b:ed:31:75:cd").await?;
/// driver.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    secret: Option<SecretString>,
    timeout: Duration,
    keepalive: Option<Duration>,
    pty: PtyConfig,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    accept_superuser: bool,
}

impl DriverBuilder {
    /// Create a new driver builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            secret: None,
            timeout: DEFAULT_TIMEOUT,
            keepalive: Some(DEFAULT_KEEPALIVE),
            pty: PtyConfig::default(),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            accept_superuser: false,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the login username, also used at the `enable` prompt.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        };
        self
    }

    /// Set the `enable` secret. Defaults to the login password.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Set the connect and per-command read timeout (default: 60s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the SSH keepalive interval; `None` disables keepalives.
    pub fn keepalive(mut self, interval: Option<Duration>) -> Self {
        self.keepalive = interval;
        self
    }

    /// Set terminal dimensions.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.pty.terminal_width = width;
        self.pty.terminal_height = height;
        self
    }

    /// Set the host key verification mode (default: accept new).
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a known_hosts file other than `~/.ssh/known_hosts`.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Treat a Superuser session as sufficiently privileged.
    pub fn accept_superuser(mut self, accept: bool) -> Self {
        self.accept_superuser = accept;
        self
    }

    /// Build the driver.
    ///
    /// This creates the driver but does not connect. Call `open()` on the
    /// returned driver to establish the connection.
    pub fn build(self) -> Result<ProcurveDriver<SshTransport>> {
        if self.host.trim().is_empty() {
            return Err(invalid("host is required"));
        }
        let username = self.username.ok_or_else(|| invalid("username is required"))?;
        if self.timeout.is_zero() {
            return Err(invalid("timeout must be non-zero"));
        }

        let secret = match (self.secret, &self.auth) {
            (Some(secret), _) => secret,
            (None, AuthMethod::Password(password)) => {
                SecretString::from(password.expose_secret().to_string())
            }
            (None, _) => SecretString::from(String::new()),
        };

        let settings = SessionSettings {
            hostname: self.host.clone(),
            username: username.clone(),
            secret,
            timeout: self.timeout,
            accept_superuser: self.accept_superuser,
        };

        let ssh_config = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth: self.auth,
            timeout: self.timeout,
            keepalive_interval: self.keepalive,
            pty: self.pty,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        ProcurveDriver::new(ssh_config, settings)
    }
}

fn invalid(message: &str) -> crate::Error {
    DriverError::InvalidConfig {
        message: message.to_string(),
    }
    .into()
}
