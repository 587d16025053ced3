//! Hardware (MAC) address normalization.
//!
//! ProCurve CLIs take addresses in dash-grouped form (`044b-ed31-75cd`),
//! while LLDP reports and most tooling use colon-delimited octets
//! (`04:4b:ed:31:75:cd`). [`MacAddress`] parses either, or the bare
//! 12-digit form, into one canonical value.

use std::fmt;
use std::str::FromStr;

use pnet_base::MacAddr;
use serde::{Serialize, Serializer};

use crate::error::AddressError;

/// A 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(MacAddr);

impl MacAddress {
    /// Create an address from raw octets.
    pub fn new(octets: [u8; 6]) -> Self {
        let [a, b, c, d, e, f] = octets;
        Self(MacAddr::new(a, b, c, d, e, f))
    }

    /// The raw octets.
    pub fn octets(&self) -> [u8; 6] {
        let MacAddr(a, b, c, d, e, f) = self.0;
        [a, b, c, d, e, f]
    }

    /// Colon-delimited lower-case octets, e.g. `04:4b:ed:31:75:cd`.
    pub fn to_colon_delimited(&self) -> String {
        self.0.to_string()
    }

    /// Dash-grouped lower-case 4-digit triplets, e.g. `044b-ed31-75cd`.
    ///
    /// This is the notation ProCurve accepts in `show mac-address <addr>`.
    pub fn to_dash_grouped(&self) -> String {
        let digits = self.to_colon_delimited().replace(':', "");
        let groups: Vec<&str> = [0, 4, 8].iter().map(|&i| &digits[i..i + 4]).collect();
        groups.join("-")
    }
}

impl From<MacAddr> for MacAddress {
    fn from(addr: MacAddr) -> Self {
        Self(addr)
    }
}

impl From<MacAddress> for MacAddr {
    fn from(addr: MacAddress) -> Self {
        addr.0
    }
}

impl FromStr for MacAddress {
    type Err = AddressError;

    /// Accepts `04:4b:ed:31:75:cd`, `04-4b-ed-31-75-cd`, `044b-ed31-75cd`,
    /// `044bed-3175cd` and `044bed3175cd`, in any letter case.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || AddressError::InvalidFormat {
            input: input.to_string(),
        };

        let digits: String = input
            .trim()
            .chars()
            .filter(|c| !matches!(c, ':' | '-'))
            .collect();

        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        // Re-delimit into octets and let MacAddr do the hex parsing
        let octets: Vec<&str> = (0..12).step_by(2).map(|i| &digits[i..i + 2]).collect();
        octets
            .join(":")
            .parse::<MacAddr>()
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
