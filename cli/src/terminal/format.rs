//! Turns a [`HostRecord`] into the key/value details the tree printer
//! renders. Unresolved attributes show the `Unknown` sentinel dimmed so
//! real data stands out.

use colored::*;

use invscan_common::network::host::{HostRecord, ServiceEntry, UNKNOWN};

type Detail = (String, ColoredString);

pub fn host_details(host: &HostRecord) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![
        ("IP".to_string(), host.ip.to_string().cyan()),
        ("MAC".to_string(), or_unknown(host.mac_display())),
        ("Vendor".to_string(), or_unknown(host.vendor_display().to_string())),
        ("Model".to_string(), or_unknown(host.model_display().to_string())),
        ("OS".to_string(), or_unknown(host.os_display().to_string())),
        ("Type".to_string(), host.device_type.to_string().yellow().bold()),
        ("Status".to_string(), host.status().green()),
    ];

    for service in &host.services {
        details.push((format!("{}/tcp", service.port), service_line(service)));
    }

    details
}

fn service_line(service: &ServiceEntry) -> ColoredString {
    match (&service.product, &service.version) {
        (Some(product), Some(version)) => {
            format!("{} ({product} {version})", service.name).normal()
        }
        (Some(product), None) => format!("{} ({product})", service.name).normal(),
        _ => service.name.clone().normal(),
    }
}

fn or_unknown(value: String) -> ColoredString {
    if value == UNKNOWN {
        value.dimmed()
    } else {
        value.normal()
    }
}
