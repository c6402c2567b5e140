use std::time::Instant;

use colored::*;
use tracing::error;

use invscan_common::config::Config;
use invscan_common::network::host::UNKNOWN;
use invscan_common::network::mac::MacOuiRepo;
use invscan_common::network::range::Subnet;
use invscan_core::probe::NetProbe;
use invscan_core::scanner::ScanService;

use crate::terminal::{print, spinner};

pub async fn run(subnet: Subnet, cfg: &Config) -> anyhow::Result<()> {
    print::header(&format!("ping sweep of {subnet}"), cfg.quiet);

    let service = ScanService::new(
        Box::new(NetProbe::new(cfg.clone())),
        Box::new(MacOuiRepo),
    );

    let progress = spinner::start("sweeping...");
    let started = Instant::now();
    let result = service.sweep(&subnet).await;
    progress.finish_and_clear();

    let entries = match result {
        Ok(entries) => entries,
        Err(e) => {
            error!("sweep failed: {e:#}");
            return Err(e);
        }
    };

    if entries.is_empty() {
        print::header("no hosts detected", cfg.quiet);
        return Ok(());
    }

    for entry in &entries {
        let ip = entry.ip.to_string().cyan();
        let mac = entry
            .mac
            .map(|mac| mac.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let hostname = entry.hostname.as_deref().unwrap_or(UNKNOWN);
        println!("  {ip:<18} {mac:<20} {hostname}");
    }

    let count = format!("{} hosts", entries.len()).bold().green();
    let elapsed = format!("{:.2}s", started.elapsed().as_secs_f64()).bold().yellow();
    println!();
    println!("Sweep complete: {count} answered in {elapsed}");
    Ok(())
}
