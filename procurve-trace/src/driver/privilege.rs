//! Privilege detection and escalation.
//!
//! ProCurve has three session levels: Operator (`>` prompt), Manager and
//! Superuser (both `#`). The prompt cannot tell Manager from Superuser, so
//! the level is read from the `show telnet` session table, where the
//! current session is the row flagged `**`:
//!
//! ```text
//!  Telnet Activity
//!
//!   Session Privilege From            To
//!   ------- --------- --------------- ---------------
//!         1 Superuser Console
//!     **  2 Operator  192.168.1.10
//! ```
//!
//! Escalating from Operator is an `enable` exchange:
//!
//! ```text
//! HP-Switch-5406zl> enable
//! Username: admin
//! Password: ********
//! HP-Switch-5406zl#
//! ```
//!
//! The resulting level is always re-read from the device; it is never
//! assumed from the exchange having completed.

use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use regex::bytes::Regex;
use serde::Serialize;

use super::procurve::ProcurveDriver;
use crate::error::{ChannelError, DriverError, ParseError, Result};
use crate::parser::Query;
use crate::platform::procurve::commands;
use crate::transport::Transport;

/// Session privilege level as reported by `show telnet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Privilege {
    Operator,
    Manager,
    Superuser,
    /// Not yet observed, or the session is closed.
    #[default]
    Unknown,
}

impl Privilege {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::Operator => "Operator",
            Privilege::Manager => "Manager",
            Privilege::Superuser => "Superuser",
            Privilege::Unknown => "Unknown",
        }
    }

    /// Whether this level unlocks the commands the driver needs.
    ///
    /// Manager always does. Superuser only counts when `accept_superuser`
    /// is set; otherwise the exact Manager match is kept.
    pub fn is_accepted(self, accept_superuser: bool) -> bool {
        match self {
            Privilege::Manager => true,
            Privilege::Superuser => accept_superuser,
            Privilege::Operator | Privilege::Unknown => false,
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Privilege {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "operator" => Ok(Privilege::Operator),
            "manager" => Ok(Privilege::Manager),
            "superuser" => Ok(Privilege::Superuser),
            _ => Err(ParseError::UnknownPrivilege {
                value: s.to_string(),
            }),
        }
    }
}

/// Last privilege level observed on the device.
///
/// Only detection in this module updates it; everything else reads.
#[derive(Debug, Default)]
pub struct PrivilegeTracker {
    current: Privilege,
}

impl PrivilegeTracker {
    pub fn current(&self) -> Privilege {
        self.current
    }

    fn observe(&mut self, level: Privilege) {
        if self.current != level {
            debug!("privilege {} -> {}", self.current, level);
        }
        self.current = level;
    }

    pub(super) fn reset(&mut self) {
        self.current = Privilege::Unknown;
    }
}

/// States of the `enable` credential exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handshake {
    /// `enable` sent; expecting the username prompt (or, on devices
    /// without a manager username, the password prompt directly).
    AwaitUsernamePrompt,
    /// Username sent; expecting the password prompt.
    AwaitPasswordPrompt,
    /// Secret sent; expecting the CLI prompt, or the password prompt again
    /// if the secret was rejected. Counts the empty lines sent so far.
    AwaitSecretReply { cleared: usize },
    /// Secret sent and the CLI prompt is back; re-reading the level.
    Verifying,
}

/// Empty lines sent to back out of repeated credential prompts before
/// waiting on the CLI prompt alone.
const MAX_CLEARED_PROMPTS: usize = 3;

impl<T: Transport> ProcurveDriver<T> {
    /// Read the session's level from `show telnet` and record it.
    pub async fn detect_privilege(&mut self) -> Result<Privilege> {
        let version = self.firmware().await?;
        let response = self.execute(commands::SHOW_TELNET).await?;

        let records = self
            .parser
            .parse(Query::DeviceStatus, &version, &response.result);
        let active = records
            .iter()
            .find(|r| r.get("active").is_some())
            .ok_or(ParseError::NoActiveSession)?;

        let level: Privilege = active.get_or_empty("user_level").parse()?;
        self.privilege.observe(level);
        Ok(level)
    }

    /// Re-read the session's level from the device.
    pub async fn get_current_privilege(&mut self) -> Result<Privilege> {
        self.detect_privilege().await
    }

    /// Make sure the session is at an accepted level.
    ///
    /// A no-op at Manager. From Operator, runs the `enable` exchange and
    /// verifies the result; an unchanged level is
    /// [`DriverError::PrivilegeEscalationFailed`]. From Superuser (unless
    /// accepted) there is nowhere to escalate to:
    /// [`DriverError::EscalationNotApplicable`]. An unknown level is
    /// detected first.
    pub async fn escalate(&mut self) -> Result<()> {
        let accept_superuser = self.settings.accept_superuser;

        let mut level = self.privilege.current();
        if level == Privilege::Unknown {
            level = self.detect_privilege().await?;
        }

        if level.is_accepted(accept_superuser) {
            debug!("{}: already at {}", self.settings.hostname, level);
            return Ok(());
        }

        match level {
            Privilege::Operator => self.enable().await,
            level => Err(DriverError::EscalationNotApplicable { level }.into()),
        }
    }

    /// Run the `enable` credential exchange from Operator.
    async fn enable(&mut self) -> Result<()> {
        info!("{}: escalating from Operator", self.settings.hostname);

        let username_prompt = self.platform.username_prompt.clone();
        let password_prompt = self.platform.password_prompt.clone();
        let credential_prompt = Regex::new(&format!(
            "(?:{})|(?:{})",
            username_prompt.as_str(),
            password_prompt.as_str()
        ))
        .map_err(ChannelError::from)?;
        let cli_prompt = self.platform.prompt.clone();
        let secret_reply = Regex::new(&format!(
            "(?:{})|(?:{})",
            cli_prompt.as_str(),
            credential_prompt.as_str()
        ))
        .map_err(ChannelError::from)?;

        self.write(commands::ENABLE).await?;
        let mut state = Handshake::AwaitUsernamePrompt;

        loop {
            state = match state {
                Handshake::AwaitUsernamePrompt => {
                    let text = self.read_until(&credential_prompt).await?;
                    if password_prompt.is_match(text.as_bytes()) {
                        self.write_secret().await?;
                        Handshake::AwaitSecretReply { cleared: 0 }
                    } else {
                        let username = self.settings.username.clone();
                        self.write(&username).await?;
                        Handshake::AwaitPasswordPrompt
                    }
                }
                Handshake::AwaitPasswordPrompt => {
                    self.read_until(&password_prompt).await?;
                    self.write_secret().await?;
                    Handshake::AwaitSecretReply { cleared: 0 }
                }
                Handshake::AwaitSecretReply { cleared } if cleared >= MAX_CLEARED_PROMPTS => {
                    self.read_until(&cli_prompt).await?;
                    Handshake::Verifying
                }
                Handshake::AwaitSecretReply { cleared } => {
                    let text = self.read_until(&secret_reply).await?;
                    if cli_prompt.is_match(text.as_bytes()) {
                        Handshake::Verifying
                    } else {
                        // Rejected; empty lines run out the device's retries
                        debug!("{}: enable secret rejected", self.settings.hostname);
                        self.write("").await?;
                        Handshake::AwaitSecretReply {
                            cleared: cleared + 1,
                        }
                    }
                }
                Handshake::Verifying => {
                    let observed = self.detect_privilege().await?;
                    if observed.is_accepted(self.settings.accept_superuser) {
                        info!("{}: now at {}", self.settings.hostname, observed);
                        return Ok(());
                    }
                    warn!(
                        "{}: escalation failed, device reports {}",
                        self.settings.hostname, observed
                    );
                    return Err(DriverError::PrivilegeEscalationFailed { observed }.into());
                }
            };
        }
    }
}
