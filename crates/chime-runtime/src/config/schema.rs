//! Configuration schema definitions.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chime_core::ReplyLimits;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChimeConfig {
    /// Transport credentials.
    #[serde(default)]
    pub login: LoginConfig,

    /// Command recognition.
    #[serde(default)]
    pub commands: CommandsConfig,

    /// Client presence.
    #[serde(default)]
    pub client: ClientConfig,

    /// Extra aliases per base alias, applied after every feature registered.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,

    /// Outbound reply limits.
    #[serde(default)]
    pub reply: ReplyLimits,

    /// Logging setup.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Free-form section per feature name.
    #[serde(default)]
    pub features: HashMap<String, Value>,
}

/// Transport credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoginConfig {
    /// Token handed to the transport. Opaque to the router.
    #[serde(default)]
    pub token: Option<String>,
}

/// Command recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Prefix marking a message as a command invocation.
    #[serde(default = "default_prefix", alias = "command_char")]
    pub prefix: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    chime_core::router::DEFAULT_PREFIX.to_string()
}

/// Client presence settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    /// "Playing" text set when the connection is ready. Empty clears it.
    #[serde(default)]
    pub game: Option<String>,
}

impl ClientConfig {
    /// The presence to set, `None` when unset or empty.
    pub fn presence(&self) -> Option<&str> {
        self.game.as_deref().filter(|g| !g.is_empty())
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level as a filter directive string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Per-module levels, e.g. `chime_core = "debug"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include file and line of each event.
    #[serde(default)]
    pub file_location: bool,

    /// Required when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(default = "default_max_files")]
    pub max_files: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            filters: BTreeMap::new(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
        }
    }
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_files() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChimeConfig::default();
        assert_eq!(config.commands.prefix, "!");
        assert_eq!(config.reply, ReplyLimits::default());
        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.client.presence().is_none());
    }

    #[test]
    fn test_deserialize_legacy_command_char() {
        let config: ChimeConfig = serde_json::from_value(serde_json::json!({
            "commands": { "command_char": "." },
            "client": { "game": "" },
            "aliases": { "timezone": ["tz"] },
        }))
        .unwrap();
        assert_eq!(config.commands.prefix, ".");
        assert_eq!(config.client.presence(), None);
        assert_eq!(config.aliases["timezone"], vec!["tz"]);
    }
}
