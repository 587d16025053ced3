//! ProCurve session controller.

use std::time::Instant;

use log::{debug, info, trace, warn};
use regex::bytes::Regex;
use secrecy::ExposeSecret;

use super::Driver;
use super::privilege::{Privilege, PrivilegeTracker};
use super::response::Response;
use super::settings::SessionSettings;
use crate::error::{ChannelError, DriverError, Result};
use crate::model::{DeviceVersion, MacTableEntry, NeighborRecord};
use crate::parser::{OutputParser, Query};
use crate::platform::procurve::{self, commands};
use crate::platform::PlatformDefinition;
use crate::transport::{SshTransport, Transport};

/// Session driver for one HP ProCurve / ArubaOS-Switch device.
///
/// Owns the transport exclusively. Every operation takes `&mut self`, so
/// at most one command is in flight per session.
pub struct ProcurveDriver<T: Transport = SshTransport> {
    pub(super) transport_config: T::Config,
    pub(super) settings: SessionSettings,
    pub(super) platform: PlatformDefinition,
    pub(super) parser: OutputParser,

    /// CLI prompt or login banner, whichever shows up first.
    login_pattern: Regex,

    /// Connected transport (None when closed).
    pub(super) transport: Option<T>,

    pub(super) privilege: PrivilegeTracker,

    /// Cached `show version`, cleared on close.
    version: Option<DeviceVersion>,
}

impl<T: Transport> ProcurveDriver<T> {
    /// Create a closed driver. Call [`Driver::open`] to connect.
    pub fn new(transport_config: T::Config, settings: SessionSettings) -> Result<Self> {
        let platform = procurve::platform().map_err(ChannelError::from)?;

        let login_pattern = match &platform.continue_prompt {
            Some(banner) => Regex::new(&format!(
                "(?:{})|(?:{})",
                platform.prompt.as_str(),
                banner.as_str()
            ))
            .map_err(ChannelError::from)?,
            None => platform.prompt.clone(),
        };

        Ok(Self {
            transport_config,
            settings,
            platform,
            parser: OutputParser::default(),
            login_pattern,
            transport: None,
            privilege: PrivilegeTracker::default(),
            version: None,
        })
    }

    /// Replace the output parser (e.g. to register extra grammars).
    pub fn with_parser(mut self, parser: OutputParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// Send `input` without waiting for anything.
    pub(super) async fn write(&mut self, input: &str) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(DriverError::NotConnected)?;
        let outcome = transport.write(input).await;
        self.check_link(outcome).await
    }

    /// Send a secret without it reaching the logs.
    pub(super) async fn write_secret(&mut self) -> Result<()> {
        trace!("{} >> ********", self.settings.hostname);
        let transport = self.transport.as_mut().ok_or(DriverError::NotConnected)?;
        let outcome = transport.write(self.settings.secret.expose_secret()).await;
        self.check_link(outcome).await
    }

    /// Wait for `pattern` within the session timeout.
    pub(super) async fn read_until(&mut self, pattern: &Regex) -> Result<String> {
        let timeout = self.settings.timeout;
        let transport = self.transport.as_mut().ok_or(DriverError::NotConnected)?;
        let outcome = transport.read_until(pattern, timeout).await;
        self.check_link(outcome).await
    }

    /// Close the session when `outcome` shows the link is lost.
    ///
    /// After a read timeout, late output is still buffered and would be
    /// taken as the reply to the next command.
    async fn check_link<R>(&mut self, outcome: Result<R>) -> Result<R> {
        let lost = matches!(&outcome, Err(e) if e.is_connection_lost());
        if lost {
            if let Err(e) = &outcome {
                warn!("{}: session lost ({}), closing", self.settings.hostname, e);
            }
            self.version = None;
            self.privilege.reset();
            if let Some(transport) = self.transport.take() {
                if let Err(e) = transport.close().await {
                    debug!("{}: close after loss failed: {}", self.settings.hostname, e);
                }
            }
        }
        outcome
    }

    /// Wait for the CLI prompt.
    pub(super) async fn read_until_prompt(&mut self) -> Result<String> {
        let prompt = self.platform.prompt.clone();
        self.read_until(&prompt).await
    }

    /// Send one command and collect its output up to the next prompt.
    pub(super) async fn execute(&mut self, command: &str) -> Result<Response> {
        let timeout = self.settings.timeout;
        let transport = self.transport.as_mut().ok_or(DriverError::NotConnected)?;

        debug!("{} >> {}", self.settings.hostname, command);
        let start = Instant::now();

        let outcome = match transport.write(command).await {
            Ok(()) => transport.read_until(&self.platform.prompt, timeout).await,
            Err(e) => Err(e),
        };
        let raw_result = self.check_link(outcome).await?;
        let elapsed = start.elapsed();

        let prompt = self
            .platform
            .prompt
            .find(raw_result.as_bytes())
            .map(|m| raw_result[m.start()..].trim().to_string())
            .unwrap_or_default();

        let result = self.platform.normalize_output(&raw_result, command);
        trace!("{} << {:?}", self.settings.hostname, result);

        let failure = self.platform.detect_failure(&result).map(str::to_string);
        let response = Response::new(command, result, raw_result, prompt, elapsed);

        Ok(match failure {
            Some(marker) => {
                debug!("{}: '{}' failed: {}", self.settings.hostname, command, marker);
                response.with_failure(marker)
            }
            None => response,
        })
    }

    /// Try `commands` in order; return the first response the device
    /// recognized, or the last one tried.
    pub async fn send_command_alternatives(&mut self, commands: &[&str]) -> Result<Response> {
        let mut last = None;

        for command in commands {
            let response = self.execute(command).await?;
            if !self.platform.is_not_recognized(&response.result) {
                return Ok(response);
            }
            debug!("{}: '{}' not recognized", self.settings.hostname, command);
            last = Some(response);
        }

        last.ok_or_else(|| {
            DriverError::InvalidConfig {
                message: "no command alternatives given".to_string(),
            }
            .into()
        })
    }

    async fn open_session(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        info!("{}: connecting", self.settings.hostname);
        let transport = T::connect(&self.transport_config).await?;
        self.transport = Some(transport);

        let login = self.login_pattern.clone();
        let greeting = self.read_until(&login).await?;

        let at_banner = self
            .platform
            .continue_prompt
            .as_ref()
            .is_some_and(|banner| banner.is_match(greeting.as_bytes()));
        if at_banner {
            debug!("{}: answering login banner", self.settings.hostname);
            self.write("").await?;
            self.read_until_prompt().await?;
        }

        let level = self.detect_privilege().await?;
        info!("{}: connected at privilege {}", self.settings.hostname, level);
        Ok(())
    }

    async fn close_session(&mut self) -> Result<()> {
        self.version = None;
        self.privilege.reset();

        if let Some(transport) = self.transport.take() {
            transport.close().await?;
            info!("{}: disconnected", self.settings.hostname);
        }
        Ok(())
    }

    /// Firmware information, fetched once per session.
    pub async fn get_version(&mut self) -> Result<DeviceVersion> {
        if let Some(version) = &self.version {
            return Ok(version.clone());
        }

        let response = self.execute(commands::SHOW_VERSION).await?;
        let version = self
            .parser
            .parse(Query::Version, "", &response.result)
            .first()
            .map(DeviceVersion::from_record)
            .unwrap_or_default();

        if version.os_version.is_empty() {
            warn!(
                "{}: firmware version not found, using classic output formats",
                self.settings.hostname
            );
        } else {
            debug!("{}: firmware {}", self.settings.hostname, version.os_version);
        }

        self.version = Some(version.clone());
        Ok(version)
    }

    /// Firmware version string used for grammar selection.
    pub(super) async fn firmware(&mut self) -> Result<String> {
        Ok(self.get_version().await?.os_version)
    }

    /// Disable output paging for the rest of the session.
    ///
    /// `no page` needs Manager, so privilege is re-checked (and escalated
    /// if needed) first.
    pub async fn disable_paging(&mut self) -> Result<()> {
        let level = self.detect_privilege().await?;
        if !level.is_accepted(self.settings.accept_superuser) {
            self.escalate().await?;
        }

        let response = self.execute(commands::NO_PAGE).await?;
        if let Some(marker) = &response.failure_message {
            warn!("{}: '{}' failed: {}", self.settings.hostname, commands::NO_PAGE, marker);
        }
        Ok(())
    }

    /// Full forwarding table.
    pub async fn get_mac_address_table(&mut self) -> Result<Vec<MacTableEntry>> {
        self.disable_paging().await?;

        let version = self.firmware().await?;
        let response = self.execute(commands::SHOW_MAC_ADDRESS).await?;

        let entries = self
            .parser
            .parse(Query::MacTable, &version, &response.result)
            .iter()
            .filter_map(MacTableEntry::from_record)
            .collect::<Vec<_>>();

        debug!("{}: {} MAC table entries", self.settings.hostname, entries.len());
        Ok(entries)
    }

    /// LLDP neighbours seen on `interface`.
    pub async fn get_neighbors_detail(&mut self, interface: &str) -> Result<Vec<NeighborRecord>> {
        let version = self.firmware().await?;
        let command = commands::show_lldp_remote_device(interface);
        let response = self.execute(&command).await?;

        let neighbors = self
            .parser
            .parse(Query::NeighborDetail, &version, &response.result)
            .iter()
            .map(NeighborRecord::from_record)
            .filter(|n| n.local_port.eq_ignore_ascii_case(interface))
            .collect::<Vec<_>>();

        debug!(
            "{}: {} LLDP neighbour(s) on {}",
            self.settings.hostname,
            neighbors.len(),
            interface
        );
        Ok(neighbors)
    }
}

impl<T: Transport> Driver for ProcurveDriver<T> {
    async fn open(&mut self) -> Result<()> {
        self.open_session().await
    }

    async fn close(&mut self) -> Result<()> {
        self.close_session().await
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        self.execute(command).await
    }

    fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    fn is_alive(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_alive())
    }

    fn current_privilege(&self) -> Privilege {
        self.privilege.current()
    }
}

impl<T: Transport> Drop for ProcurveDriver<T> {
    fn drop(&mut self) {
        if self.transport.is_some() {
            warn!(
                "{}: driver dropped while connected; call close() first",
                self.settings.hostname
            );
        }
    }
}
