//! # Chime
//!
//! A command-and-event router for chat bots.
//!
//! ```text
//! ┌───────────┐     ┌──────────────┐     ┌─────────────────────────────────────┐
//! │ Transport │────▶│ ChimeRuntime │────▶│ Router: built-in, then extensions   │
//! │  (events) │     │  (one task   │     │  message ─▶ command │ pattern handlers│
//! └───────────┘     │  per event)  │     └─────────────────────────────────────┘
//!                   └──────────────┘
//! ```
//!
//! - **Features** register commands, pattern handlers and event extensions.
//! - **Commands** are addressed by `prefix + alias`, e.g. `!help`.
//! - **Pattern handlers** react to any other message matching a regex.
//! - **Extensions** observe lifecycle events (`ready`, `error`, ...).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chime::prelude::*;
//!
//! async fn ping(ctx: CommandContext) -> HandlerResult {
//!     ctx.reply("pong").await?;
//!     Ok(())
//! }
//!
//! struct Pinger;
//!
//! impl Feature for Pinger {
//!     fn name(&self) -> &str { "pinger" }
//!
//!     fn register(&self, reg: &mut Registrar<'_>) -> RegistrationResult<()> {
//!         reg.command(CommandDecl::new("ping", ping).doc("!ping\nreplies with pong."))?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = ChimeRuntime::load()?.feature(Pinger);
//!     init_logging(&runtime.config().logging);
//!     runtime.run(my_bot, my_events).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default) / `yaml-config`: configuration file formats
//! - `json-log`: JSON log output
//! - `testing`: recording test doubles in `chime::core::testing`

pub use chime_core as core;
pub use chime_runtime as runtime;

/// Everything needed to write a feature and start the bot.
pub mod prelude {
    pub use chime_core::prelude::*;

    pub use chime_core::{
        BoxFuture, ErrorReport, HandlerError, PatternMatch, RegistrationError, TransportError,
        UserId, downcast_bot,
    };
    pub use chime_core::help::{SYNTAX_LEGEND, help_menu};

    pub use chime_runtime::config::{ChimeConfig, ConfigLoader};
    pub use chime_runtime::logging::init_from_config as init_logging;
    pub use chime_runtime::{ChimeRuntime, RunSummary, RuntimeError};

    pub use chime_runtime::prelude::*;
}
