//! Local-address resolution.
//!
//! Determines which address the OS would route outbound traffic from,
//! and derives the /24 around it as the default scan target. Connecting
//! a UDP socket sends no datagram; it only forces interface selection.
//! The socket lives for the duration of the closure and is released on
//! every exit path by drop.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use tracing::debug;

use invscan_common::network::range::Subnet;

const ROUTE_PROBE_ADDR: &str = "8.8.8.8:80";

/// The machine's outbound IP, or loopback when no route exists.
pub fn local_ip() -> IpAddr {
    let resolved = (|| -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind(("0.0.0.0", 0))?;
        socket.connect(ROUTE_PROBE_ADDR)?;
        Ok(socket.local_addr()?.ip())
    })();

    match resolved {
        Ok(ip) => ip,
        Err(e) => {
            debug!("no outbound route, falling back to loopback: {e}");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

/// Formats the /24 containing `ip`, e.g. `10.0.5.37` ⇒ `10.0.5.0/24`.
///
/// The input is treated as untrusted text: anything that does not split
/// into four octets degrades to a single-host `/32` range instead of
/// erroring.
pub fn derive_range(ip: &str) -> String {
    let octets: Vec<&str> = ip.split('.').collect();
    match octets.as_slice() {
        [o1, o2, o3, _o4] => format!("{o1}.{o2}.{o3}.0/24"),
        _ => format!("{ip}/32"),
    }
}

/// The subnet a parameterless scan targets: the /24 around the local
/// address, or the loopback /32 when even that cannot be derived.
pub fn local_subnet() -> Subnet {
    let ip = local_ip();
    let range = derive_range(&ip.to_string());
    range.parse().unwrap_or_else(|e| {
        debug!("derived range '{range}' unparseable ({e}), using loopback");
        Subnet::new(Ipv4Addr::LOCALHOST, 32).expect("loopback /32 is always valid")
    })
}
