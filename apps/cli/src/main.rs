//! RollCall CLI: senate roll-call scraper and voting-bloc clustering.
//!
//! Fetches a session's roll-call votes, recodes each senator's cast and
//! groups senators by voting behavior.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
