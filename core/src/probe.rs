//! The probe capability seam.
//!
//! The orchestrator depends only on [`ProbeSuite`]; the production
//! implementation wires the trait to raw ARP, TCP handshakes, reverse
//! DNS and banner grabbing. Integration tests substitute a mock.
//!
//! Every sub-probe is individually fault-tolerant: failures convert to
//! `None`/empty at this boundary and never cross it.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use pnet::datalink::{self, MacAddr, NetworkInterface};
use tokio::time::timeout;
use tracing::{debug, warn};

use invscan_common::config::Config;
use invscan_common::network::host::ServiceEntry;
use invscan_common::network::range::Subnet;
use invscan_protocols::{arp, banner, tcp};

/// How long the ARP sweep listens for stragglers.
const SWEEP_WAIT: Duration = Duration::from_secs(3);
/// Liveness timeout for a single handshake probe. Shorter than the
/// per-service connect timeout; a LAN host answers well inside this.
const HANDSHAKE_WAIT: Duration = Duration::from_millis(100);
/// Handshake probes in flight at once during an unprivileged sweep.
const SWEEP_CONCURRENCY: usize = 64;
/// Upper bound on a reverse-DNS lookup.
const DNS_WAIT: Duration = Duration::from_secs(2);
/// Ports worth interrogating for an OS hint.
const OS_HINT_PORTS: &[u16] = &[22, 80];

/// Everything the scan pipeline needs from the network, behind one
/// substitutable interface.
#[async_trait]
pub trait ProbeSuite: Send + Sync {
    /// Enumerates live hosts in `subnet`. Non-responders are absent
    /// from the result, never errors; `Err` means the scanning
    /// capability itself is unavailable.
    async fn discover(&self, subnet: &Subnet) -> anyhow::Result<Vec<IpAddr>>;

    /// ARP-resolves a single host's MAC with a bounded wait.
    async fn resolve_mac(&self, ip: IpAddr) -> Option<MacAddr>;

    /// Reverse-DNS hostname lookup.
    async fn resolve_hostname(&self, ip: IpAddr) -> Option<String>;

    /// Best-effort OS guess.
    async fn probe_os(&self, ip: IpAddr) -> Option<String>;

    /// Open-service enumeration over well-known TCP ports.
    async fn probe_services(&self, ip: IpAddr) -> Vec<ServiceEntry>;
}

/// Production probe suite. Stateless apart from its configuration; one
/// instance per scan invocation.
pub struct NetProbe {
    cfg: Config,
}

impl NetProbe {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    fn can_arp(&self) -> bool {
        is_root::is_root()
    }
}

#[async_trait]
impl ProbeSuite for NetProbe {
    async fn discover(&self, subnet: &Subnet) -> anyhow::Result<Vec<IpAddr>> {
        if self.can_arp() {
            if let Some(interface) = interface_for_subnet(subnet) {
                return arp_sweep(interface, *subnet).await;
            }
            debug!("no interface carries {subnet}, using handshake sweep");
        } else {
            warn!("not running as root, degrading to TCP handshake sweep");
        }
        Ok(handshake_sweep(subnet).await)
    }

    async fn resolve_mac(&self, ip: IpAddr) -> Option<MacAddr> {
        if !self.can_arp() {
            return None;
        }
        let interface = interface_for_ip(ip)?;
        let wait = self.cfg.arp_timeout;
        tokio::task::spawn_blocking(move || arp::resolve(&interface, ip, wait))
            .await
            .ok()
            .flatten()
    }

    async fn resolve_hostname(&self, ip: IpAddr) -> Option<String> {
        if self.cfg.no_dns {
            return None;
        }
        let lookup = tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip).ok());
        match timeout(DNS_WAIT, lookup).await {
            Ok(Ok(Some(name))) if name != ip.to_string() => Some(name),
            _ => None,
        }
    }

    async fn probe_os(&self, ip: IpAddr) -> Option<String> {
        for &port in OS_HINT_PORTS {
            let grabbed =
                banner::grab(ip, port, self.cfg.connect_timeout, self.cfg.banner_timeout).await;
            if let Some(os) = grabbed.as_deref().and_then(os_from_banner) {
                return Some(os);
            }
        }
        None
    }

    async fn probe_services(&self, ip: IpAddr) -> Vec<ServiceEntry> {
        // Ports are probed concurrently but collected in table order,
        // so the resulting service list is deterministic.
        let mut handles = Vec::with_capacity(banner::PROBED_PORTS.len());
        for &(port, name) in banner::PROBED_PORTS {
            let connect_wait = self.cfg.connect_timeout;
            let banner_wait = self.cfg.banner_timeout;
            handles.push(tokio::spawn(async move {
                probe_one_port(ip, port, name, connect_wait, banner_wait).await
            }));
        }

        let mut services = Vec::new();
        for handle in handles {
            if let Ok(Some(entry)) = handle.await {
                services.push(entry);
            }
        }
        services
    }
}

async fn probe_one_port(
    ip: IpAddr,
    port: u16,
    name: &'static str,
    connect_wait: Duration,
    banner_wait: Duration,
) -> Option<ServiceEntry> {
    let mut stream = tcp::connect(ip, port, connect_wait).await?;
    let mut entry = ServiceEntry::new(port, name);
    if let Some(text) = banner::read_banner(&mut stream, port, banner_wait).await {
        let (product, version) = banner::parse_banner(name, &text);
        entry.product = product;
        entry.version = version;
    }
    Some(entry)
}

async fn arp_sweep(interface: NetworkInterface, subnet: Subnet) -> anyhow::Result<Vec<IpAddr>> {
    let replies =
        tokio::task::spawn_blocking(move || arp::sweep(&interface, &subnet, SWEEP_WAIT)).await??;
    // The channel hears every ARP reply on the segment, including ones
    // nobody asked for; keep the sweep's answer inside its subnet. The
    // raw reply map is also unordered, so sort for a stable report.
    let mut live: Vec<IpAddr> = replies
        .into_keys()
        .filter(|ip| subnet.contains(*ip))
        .collect();
    live.sort();
    Ok(live)
}

/// Probes hosts in bounded-size concurrent batches so a /24 finishes in
/// a few seconds instead of minutes, while preserving address order.
async fn handshake_sweep(subnet: &Subnet) -> Vec<IpAddr> {
    let hosts: Vec<IpAddr> = subnet.hosts().collect();
    let mut live = Vec::new();
    for chunk in hosts.chunks(SWEEP_CONCURRENCY) {
        let handles: Vec<_> = chunk
            .iter()
            .map(|&ip| {
                tokio::spawn(async move {
                    tcp::handshake_probe(ip, HANDSHAKE_WAIT).await.then_some(ip)
                })
            })
            .collect();
        for handle in handles {
            if let Ok(Some(ip)) = handle.await {
                live.push(ip);
            }
        }
    }
    live
}

/// Interface carrying an IPv4 network that contains `subnet`'s hosts.
fn interface_for_subnet(subnet: &Subnet) -> Option<NetworkInterface> {
    datalink::interfaces()
        .into_iter()
        .filter(usable_interface)
        .find(|intf| {
            arp::interface_ipv4(intf)
                .map(|ip| subnet.contains(IpAddr::V4(ip)))
                .unwrap_or(false)
        })
}

fn interface_for_ip(ip: IpAddr) -> Option<NetworkInterface> {
    datalink::interfaces()
        .into_iter()
        .filter(usable_interface)
        .find(|intf| intf.ips.iter().any(|net| net.contains(ip)))
}

fn usable_interface(intf: &NetworkInterface) -> bool {
    intf.is_up() && !intf.is_loopback() && intf.mac.is_some() && intf.is_broadcast()
}

/// Keyword match over a service banner. Coarse on purpose; `None` is
/// the common case.
fn os_from_banner(text: &str) -> Option<String> {
    const SIGNATURES: &[(&str, &str)] = &[
        ("ubuntu", "Linux (Ubuntu)"),
        ("debian", "Linux (Debian)"),
        ("centos", "Linux (CentOS)"),
        ("fedora", "Linux (Fedora)"),
        ("raspbian", "Linux (Raspbian)"),
        ("windows", "Windows"),
        ("microsoft", "Windows"),
        ("iis", "Windows"),
        ("mikrotik", "RouterOS"),
        ("routeros", "RouterOS"),
        ("freebsd", "FreeBSD"),
        ("openbsd", "OpenBSD"),
    ];

    let lowered = text.to_lowercase();
    SIGNATURES
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, os)| os.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_keywords_map_to_os_names() {
        assert_eq!(
            os_from_banner("SSH-2.0-OpenSSH_8.9p1 Ubuntu-3ubuntu0.6").as_deref(),
            Some("Linux (Ubuntu)")
        );
        assert_eq!(
            os_from_banner("Server: Microsoft-IIS/10.0").as_deref(),
            Some("Windows")
        );
        assert_eq!(os_from_banner("SSH-2.0-ROSSSH").as_deref(), None);
        assert_eq!(os_from_banner(""), None);
    }

    #[tokio::test]
    async fn hostname_lookup_respects_no_dns() {
        let probe = NetProbe::new(Config {
            no_dns: true,
            ..Config::default()
        });
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        assert_eq!(probe.resolve_hostname(ip).await, None);
    }

    #[tokio::test]
    async fn handshake_sweep_keeps_address_order() {
        // Loopback answers every probe with a RST, so all six hosts of
        // the /29 count as live and must come back in address order.
        let subnet: Subnet = "127.0.0.0/29".parse().unwrap();
        let expected: Vec<IpAddr> = subnet.hosts().collect();
        assert_eq!(handshake_sweep(&subnet).await, expected);
    }

    #[tokio::test]
    #[ignore]
    async fn loopback_reverse_dns_resolves() {
        let probe = NetProbe::new(Config::default());
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        // Usually "localhost"; environment-dependent, hence ignored.
        assert!(probe.resolve_hostname(ip).await.is_some());
    }
}
