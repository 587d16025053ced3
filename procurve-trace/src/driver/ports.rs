//! Trunk (link aggregation) resolution.
//!
//! A MAC address learned on `Trk1` says nothing useful about cabling; LLDP
//! runs per physical port. Resolution asks LACP which member ports are
//! currently carrying the trunk. 16.x firmware answers
//! `show lacp interfaces <trk>`; older firmware only has the global
//! `show lacp` table, so both are tried in that order.

use log::debug;
use serde::Serialize;

use super::procurve::ProcurveDriver;
use crate::error::{DriverError, Result};
use crate::parser::Query;
use crate::platform::procurve::commands;
use crate::transport::Transport;

/// An active member port of a trunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrunkMember {
    pub port: String,
    /// LACP status as reported (`Success`, `Selected`).
    pub status: String,
}

/// A trunk and its active members, in device order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedPort {
    pub trunk: String,
    pub members: Vec<TrunkMember>,
}

impl AggregatedPort {
    pub fn ports(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.port.as_str())
    }
}

impl<T: Transport> ProcurveDriver<T> {
    /// Active members of `trunk` with their LACP status.
    ///
    /// Fails with [`DriverError::NoActiveMembers`] if none is active.
    pub async fn get_aggregate(&mut self, trunk: &str) -> Result<AggregatedPort> {
        let version = self.firmware().await?;
        let detail = commands::show_lacp_interfaces(trunk);
        let response = self
            .send_command_alternatives(&[detail.as_str(), commands::SHOW_LACP])
            .await?;

        let members = self
            .parser
            .parse(Query::LinkAggregation, &version, &response.result)
            .iter()
            .filter(|r| r.get("trunk").is_some_and(|t| t.eq_ignore_ascii_case(trunk)))
            .filter_map(|r| {
                let status = r.get("status")?;
                if !self.platform.is_active_member_state(status) {
                    return None;
                }
                Some(TrunkMember {
                    port: r.get("port")?.to_string(),
                    status: status.to_string(),
                })
            })
            .collect::<Vec<_>>();

        if members.is_empty() {
            return Err(DriverError::NoActiveMembers {
                trunk: trunk.to_string(),
            }
            .into());
        }

        debug!(
            "{}: {} resolves to {} active member(s)",
            self.settings.hostname,
            trunk,
            members.len()
        );

        Ok(AggregatedPort {
            trunk: trunk.to_string(),
            members,
        })
    }

    /// Active member ports of `trunk`, in device order.
    pub async fn resolve_aggregate(&mut self, trunk: &str) -> Result<Vec<String>> {
        let aggregate = self.get_aggregate(trunk).await?;
        Ok(aggregate.members.into_iter().map(|m| m.port).collect())
    }
}
