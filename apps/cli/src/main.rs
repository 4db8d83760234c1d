//! ChatBlocks CLI: organize a pasted AI conversation into topic blocks.
//!
//! Splits a transcript into user/assistant pairs, groups them by business
//! topic (keyword scoring or a chat model), and prints the resulting blocks.

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
