use std::time::Instant;

use colored::*;
use tracing::{error, warn};

use invscan_common::config::Config;
use invscan_common::network::host::HostRecord;
use invscan_common::network::mac::MacOuiRepo;
use invscan_core::probe::NetProbe;
use invscan_core::scanner::ScanService;

use crate::terminal::{format, print, spinner};

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    print::header("network inventory scan", cfg.quiet);

    if !is_root::is_root() {
        warn!("running unprivileged: MAC resolution disabled, liveness via TCP handshake");
    }

    let service = ScanService::new(
        Box::new(NetProbe::new(cfg.clone())),
        Box::new(MacOuiRepo),
    );

    let progress = spinner::start("probing the local network...");
    let started = Instant::now();
    let result = service.scan_network().await;
    progress.finish_and_clear();

    let hosts = match result {
        Ok(hosts) => hosts,
        Err(e) => {
            error!("scan failed: {e:#}");
            return Err(e);
        }
    };

    report(&hosts, started, cfg);
    Ok(())
}

fn report(hosts: &[HostRecord], started: Instant, cfg: &Config) {
    if hosts.is_empty() {
        print::header("no hosts detected", cfg.quiet);
        return;
    }

    for (idx, host) in hosts.iter().enumerate() {
        if cfg.quiet < 2 {
            print::tree_head(idx, host.hostname_display());
            print::as_tree_one_level(format::host_details(host));
            if idx + 1 != hosts.len() {
                println!();
            }
        }
    }

    let count = format!("{} active hosts", hosts.len()).bold().green();
    let elapsed = format!("{:.2}s", started.elapsed().as_secs_f64()).bold().yellow();
    println!();
    println!("Scan complete: {count} identified in {elapsed}");
}
