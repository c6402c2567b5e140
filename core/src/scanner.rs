//! # Scan Orchestration
//!
//! Drives the pipeline: resolve the target subnet, discover live hosts,
//! then fingerprint and classify each one. The service depends only on
//! the [`ProbeSuite`] and [`VendorRepository`] seams, so tests drive it
//! with mocks.

use std::collections::HashSet;
use std::net::IpAddr;

use tracing::{debug, info};

use invscan_common::network::host::{HostRecord, SweepEntry};
use invscan_common::network::mac::VendorRepository;
use invscan_common::network::range::Subnet;

use crate::fingerprint;
use crate::probe::ProbeSuite;
use crate::resolver;

pub struct ScanService {
    probe: Box<dyn ProbeSuite>,
    vendors: Box<dyn VendorRepository>,
}

impl ScanService {
    pub fn new(probe: Box<dyn ProbeSuite>, vendors: Box<dyn VendorRepository>) -> Self {
        Self { probe, vendors }
    }

    /// Full pipeline over the auto-resolved local /24.
    ///
    /// `Err` only when discovery itself is unavailable; a host that
    /// resists fingerprinting stays in the result with its unresolved
    /// fields unknown.
    pub async fn scan_network(&self) -> anyhow::Result<Vec<HostRecord>> {
        let subnet = resolver::local_subnet();
        self.scan_subnet(&subnet).await
    }

    /// Full pipeline over an explicit subnet.
    pub async fn scan_subnet(&self, subnet: &Subnet) -> anyhow::Result<Vec<HostRecord>> {
        info!("scanning {subnet} ({} addresses)", subnet.len());
        let live = self.discover_checked(subnet).await?;
        info!("{} live host(s) in {subnet}", live.len());

        let mut records = Vec::with_capacity(live.len());
        for ip in live {
            let record =
                fingerprint::fingerprint(self.probe.as_ref(), self.vendors.as_ref(), ip).await;
            records.push(record);
        }
        Ok(records)
    }

    /// Lightweight ping-sweep path: liveness plus MAC and hostname, no
    /// service probing, no classification.
    pub async fn sweep(&self, subnet: &Subnet) -> anyhow::Result<Vec<SweepEntry>> {
        info!("sweeping {subnet} ({} addresses)", subnet.len());
        let live = self.discover_checked(subnet).await?;

        let mut entries = Vec::with_capacity(live.len());
        for ip in live {
            let mut entry = SweepEntry::new(ip);
            entry.mac = self.probe.resolve_mac(ip).await;
            entry.hostname = self.probe.resolve_hostname(ip).await;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Discovery with the result-set invariants enforced: unique IPs,
    /// all within the requested subnet, discovery order preserved.
    async fn discover_checked(&self, subnet: &Subnet) -> anyhow::Result<Vec<IpAddr>> {
        let raw = self.probe.discover(subnet).await?;

        let mut seen: HashSet<IpAddr> = HashSet::with_capacity(raw.len());
        let mut live = Vec::with_capacity(raw.len());
        for ip in raw {
            if !subnet.contains(ip) {
                debug!("discarding out-of-range discovery answer {ip}");
                continue;
            }
            if seen.insert(ip) {
                live.push(ip);
            }
        }
        Ok(live)
    }
}
