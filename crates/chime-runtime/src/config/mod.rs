//! Configuration for the Chime runtime.
//!
//! Layered loading with figment: defaults, files, `CHIME_*` environment
//! variables, then programmatic overrides.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, ENV_PREFIX, Profile, load_config, load_config_from_file};
pub use schema::{
    ChimeConfig, ClientConfig, CommandsConfig, LogFormat, LogLevel, LogOutput, LoggingConfig,
    LoginConfig, SpanEventConfig,
};
pub use validation::validate_config;
