//! Configuration validation.

use chime_core::registry::is_valid_alias;

use super::error::{ConfigError, ConfigResult};
use super::schema::{ChimeConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &ChimeConfig) -> ConfigResult<()> {
    validate_prefix(&config.commands.prefix)?;
    validate_reply(config)?;
    validate_aliases(config)?;
    validate_logging(&config.logging)?;
    Ok(())
}

fn validate_prefix(prefix: &str) -> ConfigResult<()> {
    if prefix.is_empty() {
        return Err(ConfigError::missing_field("commands.prefix"));
    }
    if prefix.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(format!(
            "Command prefix cannot contain whitespace: {prefix:?}"
        )));
    }
    Ok(())
}

fn validate_reply(config: &ChimeConfig) -> ConfigResult<()> {
    if config.reply.max_chars == 0 {
        return Err(ConfigError::validation("reply.max_chars must be greater than 0"));
    }
    if config.reply.max_lines == 0 {
        return Err(ConfigError::validation("reply.max_lines must be greater than 0"));
    }
    Ok(())
}

/// Alias syntax only; ownership is checked when the router applies them.
fn validate_aliases(config: &ChimeConfig) -> ConfigResult<()> {
    for (base, extra) in &config.aliases {
        if let Some(bad) = extra.iter().find(|a| !is_valid_alias(a)) {
            return Err(ConfigError::validation(format!(
                "Invalid alias {bad:?} for {base:?}: aliases must only contain lowercase letters or numbers"
            )));
        }
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }
    if logging.max_files == 0 {
        return Err(ConfigError::validation("logging.max_files must be greater than 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&ChimeConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_prefix() {
        let mut config = ChimeConfig::default();
        config.commands.prefix = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.commands.prefix = "! ".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_reply_limits() {
        let mut config = ChimeConfig::default();
        config.reply.max_lines = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_alias_syntax() {
        let mut config = ChimeConfig::default();
        config.aliases.insert("timezone".into(), vec!["tz".into(), "Time".into()]);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = ChimeConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());
        config.logging.file_path = Some("chime.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
