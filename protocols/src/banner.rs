//! Service identification through banner grabbing.
//!
//! A fixed table of well-known TCP ports drives the probe; service
//! names follow the conventional nmap vocabulary so downstream
//! classification rules can match on them.

use std::net::IpAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tracing::trace;

use crate::tcp;

/// Ports probed during fingerprinting, with their conventional service
/// names. Ordered by port number; the order carries through to the
/// resulting service list.
pub const PROBED_PORTS: &[(u16, &str)] = &[
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (80, "http"),
    (110, "pop3"),
    (139, "netbios-ssn"),
    (143, "imap"),
    (443, "https"),
    (445, "microsoft-ds"),
    (515, "printer"),
    (554, "rtsp"),
    (631, "ipp"),
    (1433, "mssql"),
    (3306, "mysql"),
    (3389, "rdp"),
    (5432, "postgresql"),
    (8000, "http"),
    (8080, "http"),
    (9100, "jetdirect"),
    (37777, "dahua-dvr"),
];

const BANNER_READ_LIMIT: usize = 512;
const HTTP_PROBE: &[u8] = b"GET / HTTP/1.0\r\n\r\n";

pub fn service_name(port: u16) -> &'static str {
    PROBED_PORTS
        .iter()
        .find(|(p, _)| *p == port)
        .map(|(_, name)| *name)
        .unwrap_or("unknown")
}

/// Connects to `port` and reads whatever the service volunteers.
/// `None` on closed port, silent service or any I/O trouble.
pub async fn grab(
    ip: IpAddr,
    port: u16,
    connect_wait: Duration,
    read_wait: Duration,
) -> Option<String> {
    let mut stream = tcp::connect(ip, port, connect_wait).await?;
    read_banner(&mut stream, port, read_wait).await
}

/// Reads a banner from an already-open connection. HTTP-speaking ports
/// get a minimal GET to coax a response.
pub async fn read_banner(
    stream: &mut tokio::net::TcpStream,
    port: u16,
    read_wait: Duration,
) -> Option<String> {
    if service_name(port) == "http" {
        let sent = timeout(read_wait, stream.write_all(HTTP_PROBE)).await;
        if !matches!(sent, Ok(Ok(()))) {
            trace!("http probe on port {port} not written");
        }
    }

    let mut buf = [0u8; BANNER_READ_LIMIT];
    let read = timeout(read_wait, stream.read(&mut buf)).await;
    let n = match read {
        Ok(Ok(n)) if n > 0 => n,
        _ => return None,
    };

    let banner = String::from_utf8_lossy(&buf[..n]).trim().to_string();
    if banner.is_empty() { None } else { Some(banner) }
}

/// Pulls product and version strings out of a banner, where the wire
/// format makes them recoverable.
///
/// * SSH: `SSH-2.0-OpenSSH_8.9p1 Ubuntu ...` ⇒ (`OpenSSH`, `8.9p1`)
/// * HTTP: `Server: nginx/1.24.0` ⇒ (`nginx`, `1.24.0`)
pub fn parse_banner(service: &str, banner: &str) -> (Option<String>, Option<String>) {
    match service {
        "ssh" => parse_ssh_banner(banner),
        "http" | "https" => parse_http_banner(banner),
        _ => (None, None),
    }
}

fn parse_ssh_banner(banner: &str) -> (Option<String>, Option<String>) {
    // SSH-protoversion-softwareversion [comments]
    let line = banner.lines().next().unwrap_or_default();
    let software = line.splitn(3, '-').nth(2).map(str::trim);
    let Some(software) = software.filter(|s| !s.is_empty()) else {
        return (None, None);
    };
    let software = software.split_whitespace().next().unwrap_or(software);
    match software.split_once('_') {
        Some((product, version)) => {
            (Some(product.to_string()), Some(version.to_string()))
        }
        None => (Some(software.to_string()), None),
    }
}

fn parse_http_banner(banner: &str) -> (Option<String>, Option<String>) {
    let server = banner
        .lines()
        .find_map(|line| line.strip_prefix("Server:").or(line.strip_prefix("server:")))
        .map(str::trim);
    let Some(server) = server.filter(|s| !s.is_empty()) else {
        return (None, None);
    };
    match server.split_once('/') {
        Some((product, rest)) => {
            let version = rest.split_whitespace().next().unwrap_or(rest);
            (Some(product.to_string()), Some(version.to_string()))
        }
        None => (Some(server.to_string()), None),
    }
}
