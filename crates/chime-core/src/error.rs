//! Error types for the Chime router.
//!
//! Two disjoint classes of failure exist:
//!
//! - [`RegistrationError`]: programmer mistakes made while features register
//!   themselves. These are detected before any traffic and abort startup.
//! - [`HandlerError`]: anything a command body, pattern handler or event
//!   extension returns at dispatch time. These are never recovered by the
//!   router; they travel to the [`ErrorSink`](crate::sink::ErrorSink).

use thiserror::Error;

/// Boxed error returned by handlers.
///
/// Any `std::error::Error + Send + Sync` converts into it, so handlers can use `?`
/// on whatever their business logic produces.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by every registered callback.
pub type HandlerResult = Result<(), HandlerError>;

// =============================================================================
// Registration Errors
// =============================================================================

/// Configuration errors raised while building the router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The alias is already mapped to another command.
    #[error("the alias \"{alias}\" is already in use for command {owner}")]
    DuplicateAlias {
        /// The offending alias.
        alias: String,
        /// Key of the command that already owns it.
        owner: String,
    },

    /// The alias contains characters outside `[a-z0-9]`.
    #[error("the alias \"{0}\" is invalid; aliases must only contain lowercase letters or numbers")]
    InvalidAlias(String),

    /// The command was declared without documentation.
    #[error("missing documentation in command \"{0}\"")]
    MissingDocumentation(String),

    /// The trigger pattern failed to compile.
    #[error("invalid trigger \"{pattern}\": {reason}")]
    InvalidPattern {
        /// Source text of the pattern.
        pattern: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// The trigger pattern is already registered.
    #[error("cannot reuse pattern \"{0}\"")]
    DuplicatePattern(String),

    /// A late alias declaration names a base alias nobody registered.
    #[error("cannot add aliases to unknown command alias \"{0}\"")]
    UnknownBaseAlias(String),

    /// The event name is empty or contains whitespace.
    #[error("invalid lifecycle event name \"{0}\"")]
    InvalidEventName(String),
}

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors reported by the outbound side of the transport.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The transport is not connected.
    #[error("transport is not connected")]
    NotConnected,

    /// The message could not be delivered.
    #[error("failed to send message to {channel}: {reason}")]
    SendFailed {
        /// Destination channel.
        channel: String,
        /// Reason reported by the transport.
        reason: String,
    },

    /// The bot lacks permission for the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_alias_message_names_owner() {
        let err = RegistrationError::DuplicateAlias {
            alias: "h".into(),
            owner: "general.help".into(),
        };
        assert_eq!(
            err.to_string(),
            "the alias \"h\" is already in use for command general.help"
        );
    }

    #[test]
    fn test_transport_error_converts_into_handler_error() {
        fn fails() -> HandlerResult {
            Err(TransportError::NotConnected)?
        }
        let err = fails().unwrap_err();
        assert_eq!(err.to_string(), "transport is not connected");
    }
}
