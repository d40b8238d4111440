//! Error types.
//!
//! Validation failures are not errors: they are reported through field state
//! and the form's error reporter. These types cover configuration mistakes.

use thiserror::Error;

/// Errors raised while registering validators.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The class token already names a validator. The first registration is
    /// kept.
    #[error("Cannot register field ({token}), as this namespace is in use")]
    DuplicateToken {
        /// The colliding class token.
        token: String,
    },

    /// A plugin extends a base variant that does not exist.
    #[error("Unknown base variant '{0}'")]
    UnknownVariant(String),

    /// A match or sanitize pattern failed to compile.
    #[error("Invalid pattern for '{token}': {source}")]
    InvalidPattern {
        /// The class token being registered.
        token: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while reading page configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON or has the wrong shape.
    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The merged option tree has a value of the wrong type.
    #[error("Invalid options: {0}")]
    InvalidOptions(#[source] serde_json::Error),

    /// A translation entry carries a pattern that does not compile.
    #[error("Invalid pattern in translation {lang}/{token}: {source}")]
    InvalidTranslation {
        lang: String,
        token: String,
        #[source]
        source: regex::Error,
    },
}
