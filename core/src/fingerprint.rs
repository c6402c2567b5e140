//! Per-host fingerprinting.
//!
//! Runs every sub-probe against one address and assembles the record.
//! Sub-probes are independent: one timing out or failing leaves its own
//! field unresolved and nothing else. The record is complete even when
//! every attribute except the IP stayed unknown — partial data beats no
//! data.

use std::net::IpAddr;

use tracing::debug;

use invscan_common::network::host::HostRecord;
use invscan_common::network::mac::VendorRepository;

use crate::classify;
use crate::probe::ProbeSuite;

pub async fn fingerprint(
    probe: &dyn ProbeSuite,
    vendors: &dyn VendorRepository,
    ip: IpAddr,
) -> HostRecord {
    let mut record = HostRecord::new(ip);

    record.hostname = probe.resolve_hostname(ip).await;
    record.mac = probe.resolve_mac(ip).await;
    // Vendor is derived, not probed: no MAC means no OUI to look up.
    record.vendor = record.mac.and_then(|mac| vendors.vendor_for(mac));
    record.os_guess = probe.probe_os(ip).await;
    record.services = probe.probe_services(ip).await;
    record.model = HostRecord::derive_model(&record.services);
    record.device_type = classify::classify(&record.services);

    debug!(
        "fingerprinted {ip}: {} service(s), type {}",
        record.services.len(),
        record.device_type
    );
    record
}
