//! # Subnet Model
//!
//! A scan target is always a contiguous IPv4 network, usually the /24
//! derived from the local address. Parsing and iteration are delegated
//! to `pnet::ipnetwork`.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

/// An IPv4 network to sweep, e.g. `192.168.1.0/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet {
    network: Ipv4Network,
}

impl Subnet {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> anyhow::Result<Self> {
        let network = Ipv4Network::new(addr, prefix)?;
        Ok(Self { network })
    }

    /// Iterates the usable host addresses, excluding the network and
    /// broadcast addresses for prefixes shorter than /31.
    pub fn hosts(&self) -> impl Iterator<Item = IpAddr> + '_ {
        let start: u32 = self.network.network().into();
        let end: u32 = self.network.broadcast().into();
        let (first, last) = if self.network.prefix() >= 31 {
            (start, end)
        } else {
            (start.saturating_add(1), end.saturating_sub(1))
        };
        (first..=last).map(|raw| IpAddr::V4(Ipv4Addr::from(raw)))
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        match addr {
            IpAddr::V4(v4) => self.network.contains(v4),
            IpAddr::V6(_) => false,
        }
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    pub fn len(&self) -> usize {
        self.hosts().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromStr for Subnet {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let network: Ipv4Network = s
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid subnet '{s}': {e}"))?;
        Ok(Self { network })
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network.network(), self.network.prefix())
    }
}
