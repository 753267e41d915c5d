//! Runtime error types.

use chime_core::{RegistrationError, TransportError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can stop the runtime from starting or running.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A feature, or a configured alias, failed to register.
    #[error("Registration failed: {0}")]
    Registration(#[from] RegistrationError),

    /// The transport failed outside any handler.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
