//! Device-type classification.
//!
//! A coarse, explainable heuristic over noisy port data: an ordered
//! rule cascade where the first match wins and later rules are never
//! consulted. The order encodes priority among overlapping signals — a
//! host exposing both a raw-print port and a web UI is a printer whose
//! management page happens to answer, not a router.

use invscan_common::network::host::{DeviceType, ServiceEntry};

const PRINTER_PORTS: &[u16] = &[515, 631, 9100];
const WEB_PORTS: &[u16] = &[80, 443, 8080];
const CAMERA_PORTS: &[u16] = &[554, 8000, 37777];
const COMPUTER_SERVICES: &[&str] = &["microsoft-ds", "netbios-ssn", "ssh", "rdp"];
const SERVER_SERVICES: &[&str] = &["http", "https", "mysql", "postgresql", "mssql"];

/// Maps a service list to a device type. Pure and deterministic: the
/// same list always classifies identically. An empty list means the
/// probe saw nothing to go on, which is `Unknown`, not `NetworkDevice`.
pub fn classify(services: &[ServiceEntry]) -> DeviceType {
    if services.is_empty() {
        return DeviceType::Unknown;
    }

    if any_port(services, PRINTER_PORTS) {
        return DeviceType::Printer;
    }

    if any_port(services, WEB_PORTS) && any_name(services, &["http", "https"]) {
        return DeviceType::Router;
    }

    if any_port(services, CAMERA_PORTS) {
        return DeviceType::IpCamera;
    }

    if any_name(services, COMPUTER_SERVICES) {
        return DeviceType::Computer;
    }

    if any_name(services, SERVER_SERVICES) {
        return DeviceType::Server;
    }

    DeviceType::NetworkDevice
}

fn any_port(services: &[ServiceEntry], ports: &[u16]) -> bool {
    services.iter().any(|s| ports.contains(&s.port))
}

fn any_name(services: &[ServiceEntry], names: &[&str]) -> bool {
    services.iter().any(|s| names.contains(&s.name.as_str()))
}
