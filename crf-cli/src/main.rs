//! CRF CLI - Command line tool for Canadian river flow data.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "crf-cli",
    version,
    about = "Canadian river flow data toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: crf_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    crf_cmd::run(cli.command).await
}
