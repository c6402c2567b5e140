mod commands;
mod terminal;

use commands::{CommandLine, Commands, scan, sweep};
use invscan_common::config::Config;
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();

    logging::init(cli.quiet);

    let cfg = Config {
        no_dns: cli.no_dns,
        quiet: cli.quiet,
        ..Config::default()
    };

    match cli.command {
        Commands::Scan => scan::run(&cfg).await,
        Commands::Sweep { subnet } => sweep::run(subnet, &cfg).await,
    }
}
