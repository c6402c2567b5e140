pub mod scan;
pub mod sweep;

use clap::{ArgAction, Parser, Subcommand};
use invscan_common::network::range::Subnet;

#[derive(Parser)]
#[command(name = "invscan")]
#[command(about = "Network discovery for IT-asset inventories.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Skip reverse-DNS lookups
    #[arg(long, global = true)]
    pub no_dns: bool,

    /// Mute progressively more terminal output
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover and fingerprint every host on the local /24
    #[command(alias = "s")]
    Scan,
    /// Lightweight ping sweep of a subnet (ip, MAC, hostname only)
    #[command(alias = "w")]
    Sweep {
        #[arg(default_value = "192.168.1.0/24")]
        subnet: Subnet,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
