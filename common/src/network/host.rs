//! # Host Data Model
//!
//! Everything a scan knows about a single live host. Records are built
//! fresh per invocation and never shared between hosts, so a probe
//! failure against one address cannot corrupt another record.

use std::fmt;
use std::net::IpAddr;

use pnet::datalink::MacAddr;

/// Sentinel rendered for any attribute a probe ran for but could not
/// determine. Distinct from the host being absent altogether.
pub const UNKNOWN: &str = "Unknown";

/// One open TCP service on a probed host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    pub port: u16,
    /// Protocol/service string, e.g. "http" or "ssh".
    pub name: String,
    pub product: Option<String>,
    pub version: Option<String>,
}

impl ServiceEntry {
    pub fn new(port: u16, name: impl Into<String>) -> Self {
        Self {
            port,
            name: name.into(),
            product: None,
            version: None,
        }
    }

    pub fn product_display(&self) -> &str {
        self.product.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn version_display(&self) -> &str {
        self.version.as_deref().unwrap_or(UNKNOWN)
    }
}

/// Coarse device-type label derived from the service list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Printer,
    Router,
    IpCamera,
    Computer,
    Server,
    NetworkDevice,
    Unknown,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeviceType::Printer => "Printer",
            DeviceType::Router => "Router",
            DeviceType::IpCamera => "IP Camera",
            DeviceType::Computer => "Computer",
            DeviceType::Server => "Server",
            DeviceType::NetworkDevice => "Network Device",
            DeviceType::Unknown => UNKNOWN,
        };
        f.write_str(label)
    }
}

/// Full fingerprint of one responding host.
///
/// Presence in a scan result means the host answered discovery; there is
/// no "inactive" record.
#[derive(Debug, Clone)]
pub struct HostRecord {
    pub ip: IpAddr,
    pub hostname: Option<String>,
    pub mac: Option<MacAddr>,
    pub vendor: Option<String>,
    pub os_guess: Option<String>,
    /// Hardware/software model, taken from the first service that
    /// volunteered a product string.
    pub model: Option<String>,
    pub services: Vec<ServiceEntry>,
    pub device_type: DeviceType,
}

impl HostRecord {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            hostname: None,
            mac: None,
            vendor: None,
            os_guess: None,
            model: None,
            services: Vec::new(),
            device_type: DeviceType::Unknown,
        }
    }

    /// Any record present in a result set is live by definition.
    pub fn status(&self) -> &'static str {
        "Active"
    }

    pub fn hostname_display(&self) -> &str {
        self.hostname.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn mac_display(&self) -> String {
        self.mac
            .map(|mac| mac.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    pub fn vendor_display(&self) -> &str {
        self.vendor.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn os_display(&self) -> &str {
        self.os_guess.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn model_display(&self) -> &str {
        self.model.as_deref().unwrap_or(UNKNOWN)
    }

    /// First service product that is actually known; printers and
    /// cameras tend to put their model name there.
    pub fn derive_model(services: &[ServiceEntry]) -> Option<String> {
        services.iter().find_map(|s| s.product.clone())
    }
}

/// The lightweight sweep result: liveness plus the two attributes cheap
/// enough to resolve without a full fingerprint pass.
#[derive(Debug, Clone)]
pub struct SweepEntry {
    pub ip: IpAddr,
    pub mac: Option<MacAddr>,
    pub hostname: Option<String>,
}

impl SweepEntry {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            mac: None,
            hostname: None,
        }
    }
}
