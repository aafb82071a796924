//! WQT CLI - Command line tool for long-term water-quality trend analysis.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "wqt-cli",
    version,
    about = "Water-quality total-nitrogen trend toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: wqt_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    wqt_cmd::run(cli.command)
}
