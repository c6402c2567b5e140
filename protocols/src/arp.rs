//! Raw ARP probing over a `pnet` datalink channel.
//!
//! Requires a broadcast-capable interface and root privileges to open
//! the channel. Callers without either fall back to [`crate::tcp`].

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use pnet::datalink::{self, Channel, MacAddr, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use tracing::debug;

use invscan_common::network::range::Subnet;

const ETH_FRAME_LEN: usize = 42;
const ARP_PACKET_LEN: usize = 28;
const READ_POLL: Duration = Duration::from_millis(100);
const SEND_PAUSE: Duration = Duration::from_millis(2);

/// Sends an ARP request to every host in `subnet` and collects replies
/// until `wait` elapses. Non-responders are simply absent from the map.
pub fn sweep(
    interface: &NetworkInterface,
    subnet: &Subnet,
    wait: Duration,
) -> anyhow::Result<HashMap<IpAddr, MacAddr>> {
    let targets: Vec<Ipv4Addr> = subnet
        .hosts()
        .filter_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .collect();
    request_and_collect(interface, &targets, wait)
}

/// Resolves a single host's MAC with a bounded (≈1 s) wait. Timeouts
/// and send failures both yield `None`.
pub fn resolve(interface: &NetworkInterface, ip: IpAddr, wait: Duration) -> Option<MacAddr> {
    let target = match ip {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(_) => return None,
    };
    match request_and_collect(interface, &[target], wait) {
        Ok(replies) => replies.get(&ip).copied(),
        Err(e) => {
            debug!("ARP resolve for {ip} failed: {e}");
            None
        }
    }
}

fn request_and_collect(
    interface: &NetworkInterface,
    targets: &[Ipv4Addr],
    wait: Duration,
) -> anyhow::Result<HashMap<IpAddr, MacAddr>> {
    let source_ip = interface_ipv4(interface)
        .with_context(|| format!("interface {} has no IPv4 address", interface.name))?;
    let source_mac = interface
        .mac
        .with_context(|| format!("interface {} has no MAC address", interface.name))?;

    let mut config = datalink::Config::default();
    config.read_timeout = Some(READ_POLL);

    let (mut tx, mut rx) = match datalink::channel(interface, config) {
        Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
        Ok(_) => return Err(anyhow!("unhandled datalink channel type")),
        Err(e) => return Err(anyhow!("failed to open datalink channel: {e}")),
    };

    // Collect replies on a dedicated thread so slow sends never cause
    // missed responses.
    let deadline = Instant::now() + wait;
    let rx_task = thread::spawn(move || {
        let mut replies: HashMap<IpAddr, MacAddr> = HashMap::new();
        while Instant::now() < deadline {
            let frame = match rx.next() {
                Ok(frame) => frame,
                Err(_) => continue,
            };
            let Some(eth) = EthernetPacket::new(frame) else {
                continue;
            };
            if eth.get_ethertype() != EtherTypes::Arp {
                continue;
            }
            let Some(arp) = ArpPacket::new(eth.payload()) else {
                continue;
            };
            if arp.get_operation() == ArpOperations::Reply {
                replies.insert(
                    IpAddr::V4(arp.get_sender_proto_addr()),
                    arp.get_sender_hw_addr(),
                );
            }
        }
        replies
    });

    for &target in targets {
        if target == source_ip {
            continue;
        }
        let frame = build_request(source_mac, source_ip, target)?;
        if let Some(Err(e)) = tx.send_to(&frame, None) {
            debug!("ARP request to {target} not sent: {e}");
        }
        thread::sleep(SEND_PAUSE);
    }

    rx_task
        .join()
        .map_err(|_| anyhow!("ARP receiver thread panicked"))
}

fn build_request(
    source_mac: MacAddr,
    source_ip: Ipv4Addr,
    target: Ipv4Addr,
) -> anyhow::Result<Vec<u8>> {
    let mut eth_buffer = vec![0u8; ETH_FRAME_LEN];
    let mut arp_buffer = [0u8; ARP_PACKET_LEN];

    let mut arp =
        MutableArpPacket::new(&mut arp_buffer).context("ARP buffer too small")?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(source_mac);
    arp.set_sender_proto_addr(source_ip);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_target_proto_addr(target);

    let mut eth =
        MutableEthernetPacket::new(&mut eth_buffer).context("ethernet buffer too small")?;
    eth.set_destination(MacAddr::broadcast());
    eth.set_source(source_mac);
    eth.set_ethertype(EtherTypes::Arp);
    eth.set_payload(arp.packet());

    Ok(eth_buffer)
}

/// First IPv4 address configured on the interface.
pub fn interface_ipv4(interface: &NetworkInterface) -> Option<Ipv4Addr> {
    interface.ips.iter().find_map(|net| match net {
        IpNetwork::V4(v4) => Some(v4.ip()),
        IpNetwork::V6(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_frame_is_wire_sized() {
        let frame = build_request(
            MacAddr::new(0xde, 0xad, 0xbe, 0xef, 0x00, 0x01),
            Ipv4Addr::new(192, 168, 1, 10),
            Ipv4Addr::new(192, 168, 1, 20),
        )
        .unwrap();
        assert_eq!(frame.len(), ETH_FRAME_LEN);

        let eth = EthernetPacket::new(&frame).unwrap();
        assert_eq!(eth.get_ethertype(), EtherTypes::Arp);
        assert_eq!(eth.get_destination(), MacAddr::broadcast());

        let arp = ArpPacket::new(eth.payload()).unwrap();
        assert_eq!(arp.get_operation(), ArpOperations::Request);
        assert_eq!(arp.get_target_proto_addr(), Ipv4Addr::new(192, 168, 1, 20));
    }
}
