//! Orchestrator tests over a scripted probe suite.
//!
//! The mock answers from fixed fixtures and can be told to fail
//! individual sub-probes per host, which is how the fault-isolation
//! guarantees are exercised without touching a network.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;

use async_trait::async_trait;
use pnet::datalink::MacAddr;

use invscan_common::network::host::{DeviceType, ServiceEntry, UNKNOWN};
use invscan_common::network::mac::VendorRepository;
use invscan_common::network::range::Subnet;
use invscan_core::probe::ProbeSuite;
use invscan_core::scanner::ScanService;

#[derive(Default)]
struct MockProbe {
    live: Vec<IpAddr>,
    hostnames: HashMap<IpAddr, String>,
    macs: HashMap<IpAddr, MacAddr>,
    oses: HashMap<IpAddr, String>,
    services: HashMap<IpAddr, Vec<ServiceEntry>>,
    /// Hosts whose DNS sub-probe "times out".
    dns_failures: HashSet<IpAddr>,
}

impl MockProbe {
    fn with_live(ips: &[&str]) -> Self {
        Self {
            live: ips.iter().map(|ip| ip.parse().unwrap()).collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ProbeSuite for MockProbe {
    async fn discover(&self, _subnet: &Subnet) -> anyhow::Result<Vec<IpAddr>> {
        Ok(self.live.clone())
    }

    async fn resolve_mac(&self, ip: IpAddr) -> Option<MacAddr> {
        self.macs.get(&ip).copied()
    }

    async fn resolve_hostname(&self, ip: IpAddr) -> Option<String> {
        if self.dns_failures.contains(&ip) {
            return None;
        }
        self.hostnames.get(&ip).cloned()
    }

    async fn probe_os(&self, ip: IpAddr) -> Option<String> {
        self.oses.get(&ip).cloned()
    }

    async fn probe_services(&self, ip: IpAddr) -> Vec<ServiceEntry> {
        self.services.get(&ip).cloned().unwrap_or_default()
    }
}

struct StaticVendors;

impl VendorRepository for StaticVendors {
    fn vendor_for(&self, mac: MacAddr) -> Option<String> {
        (mac.0 == 0x3c).then(|| "Google, Inc.".to_string())
    }
}

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn service(port: u16, name: &str) -> ServiceEntry {
    ServiceEntry::new(port, name)
}

fn subnet() -> Subnet {
    "192.168.1.0/24".parse().unwrap()
}

#[tokio::test]
async fn result_follows_discovery_order() {
    let probe = MockProbe::with_live(&["192.168.1.30", "192.168.1.2", "192.168.1.17"]);
    let service = ScanService::new(Box::new(probe), Box::new(StaticVendors));

    let hosts = service.scan_subnet(&subnet()).await.unwrap();
    let ips: Vec<IpAddr> = hosts.iter().map(|h| h.ip).collect();
    assert_eq!(
        ips,
        vec![ip("192.168.1.30"), ip("192.168.1.2"), ip("192.168.1.17")]
    );
}

#[tokio::test]
async fn duplicate_discovery_answers_collapse() {
    let probe = MockProbe::with_live(&["192.168.1.5", "192.168.1.5", "192.168.1.6"]);
    let service = ScanService::new(Box::new(probe), Box::new(StaticVendors));

    let hosts = service.scan_subnet(&subnet()).await.unwrap();
    assert_eq!(hosts.len(), 2);
    let unique: HashSet<IpAddr> = hosts.iter().map(|h| h.ip).collect();
    assert_eq!(unique.len(), 2);
}

#[tokio::test]
async fn out_of_range_answers_are_discarded() {
    // A probe answer outside the requested subnet never reaches the
    // result set.
    let probe = MockProbe::with_live(&["192.168.1.5", "10.9.9.9"]);
    let service = ScanService::new(Box::new(probe), Box::new(StaticVendors));

    let hosts = service.scan_subnet(&subnet()).await.unwrap();
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].ip, ip("192.168.1.5"));
}

#[tokio::test]
async fn dns_failure_on_one_host_leaves_others_intact() {
    let mut probe = MockProbe::with_live(&["192.168.1.5", "192.168.1.6"]);
    probe
        .hostnames
        .insert(ip("192.168.1.5"), "printer-3f".to_string());
    probe
        .hostnames
        .insert(ip("192.168.1.6"), "desk-07".to_string());
    probe.dns_failures.insert(ip("192.168.1.5"));

    let service = ScanService::new(Box::new(probe), Box::new(StaticVendors));
    let hosts = service.scan_subnet(&subnet()).await.unwrap();

    // The failing host stays in the result, downgraded to Unknown.
    assert_eq!(hosts[0].hostname, None);
    assert_eq!(hosts[0].hostname_display(), UNKNOWN);
    // Its sibling is untouched.
    assert_eq!(hosts[1].hostname.as_deref(), Some("desk-07"));
}

#[tokio::test]
async fn host_with_nothing_but_an_ip_is_still_reported() {
    let probe = MockProbe::with_live(&["192.168.1.200"]);
    let service = ScanService::new(Box::new(probe), Box::new(StaticVendors));

    let hosts = service.scan_subnet(&subnet()).await.unwrap();
    assert_eq!(hosts.len(), 1);
    let host = &hosts[0];
    assert_eq!(host.hostname, None);
    assert_eq!(host.mac, None);
    assert_eq!(host.vendor, None);
    assert_eq!(host.os_guess, None);
    assert!(host.services.is_empty());
    assert_eq!(host.device_type, DeviceType::Unknown);
    assert_eq!(host.status(), "Active");
}

#[tokio::test]
async fn vendor_derives_from_mac_through_the_repository() {
    let mut probe = MockProbe::with_live(&["192.168.1.5", "192.168.1.6"]);
    probe.macs.insert(
        ip("192.168.1.5"),
        MacAddr::new(0x3c, 0x5a, 0xb4, 0x01, 0x02, 0x03),
    );
    probe.macs.insert(
        ip("192.168.1.6"),
        MacAddr::new(0x02, 0x00, 0x00, 0x01, 0x02, 0x03),
    );

    let service = ScanService::new(Box::new(probe), Box::new(StaticVendors));
    let hosts = service.scan_subnet(&subnet()).await.unwrap();

    assert_eq!(hosts[0].vendor.as_deref(), Some("Google, Inc."));
    // MAC resolved but OUI unlisted: vendor stays unknown.
    assert!(hosts[1].mac.is_some());
    assert_eq!(hosts[1].vendor, None);
}

#[tokio::test]
async fn classification_runs_on_probed_services() {
    let mut probe = MockProbe::with_live(&["192.168.1.40", "192.168.1.41", "192.168.1.42"]);
    probe.services.insert(
        ip("192.168.1.40"),
        vec![service(9100, "jetdirect"), service(80, "http")],
    );
    probe
        .services
        .insert(ip("192.168.1.41"), vec![service(22, "ssh")]);
    probe.services.insert(
        ip("192.168.1.42"),
        vec![service(443, "https"), service(80, "http")],
    );

    let service_layer = ScanService::new(Box::new(probe), Box::new(StaticVendors));
    let hosts = service_layer.scan_subnet(&subnet()).await.unwrap();

    assert_eq!(hosts[0].device_type, DeviceType::Printer);
    assert_eq!(hosts[1].device_type, DeviceType::Computer);
    assert_eq!(hosts[2].device_type, DeviceType::Router);
}

#[tokio::test]
async fn model_derives_from_first_known_service_product() {
    let mut probe = MockProbe::with_live(&["192.168.1.50", "192.168.1.51"]);
    let mut ipp = service(631, "ipp");
    ipp.product = Some("HP LaserJet 4250".to_string());
    probe.services.insert(
        ip("192.168.1.50"),
        vec![service(9100, "jetdirect"), ipp],
    );
    // All products unknown: model stays unknown too.
    probe
        .services
        .insert(ip("192.168.1.51"), vec![service(22, "ssh")]);

    let service_layer = ScanService::new(Box::new(probe), Box::new(StaticVendors));
    let hosts = service_layer.scan_subnet(&subnet()).await.unwrap();

    assert_eq!(hosts[0].model.as_deref(), Some("HP LaserJet 4250"));
    assert_eq!(hosts[0].model_display(), "HP LaserJet 4250");
    assert_eq!(hosts[1].model, None);
    assert_eq!(hosts[1].model_display(), UNKNOWN);
}

#[tokio::test]
async fn sweep_resolves_only_mac_and_hostname() {
    let mut probe = MockProbe::with_live(&["192.168.1.5"]);
    probe
        .hostnames
        .insert(ip("192.168.1.5"), "switch-2b".to_string());
    probe.macs.insert(
        ip("192.168.1.5"),
        MacAddr::new(0x3c, 0x5a, 0xb4, 0x01, 0x02, 0x03),
    );
    // Services configured but the sweep path must never ask for them.
    probe
        .services
        .insert(ip("192.168.1.5"), vec![service(22, "ssh")]);

    let service_layer = ScanService::new(Box::new(probe), Box::new(StaticVendors));
    let entries = service_layer.sweep(&subnet()).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].hostname.as_deref(), Some("switch-2b"));
    assert!(entries[0].mac.is_some());
}

#[tokio::test]
async fn failed_discovery_surfaces_as_error() {
    struct BrokenProbe;

    #[async_trait]
    impl ProbeSuite for BrokenProbe {
        async fn discover(&self, _subnet: &Subnet) -> anyhow::Result<Vec<IpAddr>> {
            anyhow::bail!("scanning capability unavailable")
        }
        async fn resolve_mac(&self, _ip: IpAddr) -> Option<MacAddr> {
            None
        }
        async fn resolve_hostname(&self, _ip: IpAddr) -> Option<String> {
            None
        }
        async fn probe_os(&self, _ip: IpAddr) -> Option<String> {
            None
        }
        async fn probe_services(&self, _ip: IpAddr) -> Vec<ServiceEntry> {
            Vec::new()
        }
    }

    let service = ScanService::new(Box::new(BrokenProbe), Box::new(StaticVendors));
    let result = service.scan_subnet(&subnet()).await;
    assert!(result.is_err());
}
