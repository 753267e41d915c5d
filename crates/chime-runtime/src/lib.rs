//! Chime Runtime: everything around the router.
//!
//! - Layered configuration ([`config`]): defaults, `chime.toml`, `CHIME_*`
//!   environment variables.
//! - Logging setup driven by that configuration ([`logging`]).
//! - The receive loop ([`ChimeRuntime`]) that feeds transport events into the
//!   router and turns handler failures into `error` events.
//!
//! ```rust,ignore
//! use chime_runtime::{ChimeRuntime, logging};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = ChimeRuntime::load()?.feature(General);
//!     logging::init_from_config(&runtime.config().logging);
//!     runtime.run(bot, events).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ChimeConfig, ConfigError, ConfigLoader, ConfigResult, load_config};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{ChimeRuntime, RunSummary};

pub use tracing;

/// Logging macros for feature code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
