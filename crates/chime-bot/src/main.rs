//! Chime on the console.
//!
//! Reads one message per line from stdin and prints every reply to stdout.
//!
//! ```bash
//! cargo run --package chime-bot -- --config chime.toml
//! ```

mod console;
mod features;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chime::core::{ChannelId, User};
use chime::prelude::*;
use clap::Parser;
use tokio::io::BufReader;

use crate::console::ConsoleBot;
use crate::features::General;

#[derive(Parser, Debug)]
#[command(name = "chime", version, about = "Chime chat bot on the console")]
struct Cli {
    /// Configuration file. Defaults to chime.toml or config.toml in the
    /// current directory or the user config directory.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. `production`.
    #[arg(short, long)]
    profile: Option<String>,

    /// Command prefix, overriding the configured one.
    #[arg(long)]
    prefix: Option<String>,

    /// Name shown as the author of console input.
    #[arg(long, default_value = "console")]
    user: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let result = runtime.block_on(run(cli));
    // stdin reads block a worker thread; don't wait for them.
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let mut loader = ConfigLoader::new();
    if let Some(profile) = &cli.profile {
        loader = loader.profile(profile);
    }
    if let Some(path) = &cli.config {
        loader = loader.file(path);
    }
    if let Some(prefix) = &cli.prefix {
        loader = loader.set("commands.prefix", prefix);
    }
    let config = loader.load().context("failed to load configuration")?;
    init_logging(&config.logging);

    let bot = Arc::new(ConsoleBot::stdout("chime"));
    let events = console::events(
        BufReader::new(tokio::io::stdin()),
        User::new(cli.user.as_str(), cli.user.as_str()),
        ChannelId::new("console"),
    );

    let summary = ChimeRuntime::new(config)
        .feature(General)
        .run(bot, events)
        .await?;
    info!(
        events = summary.events,
        commands = summary.commands_parsed,
        "Bye"
    );
    Ok(())
}
