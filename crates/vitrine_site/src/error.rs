//! Error types for vitrine_site

use thiserror::Error;
use vitrine_animation::AnimationError;

use crate::contact::FormField;

/// Errors that can occur while building or running the site
#[derive(Error, Debug)]
pub enum SiteError {
    /// A TOML document (site config or catalog) could not be parsed
    #[error("TOML parse failed: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration value out of range
    #[error("invalid config value `{field}`: {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: String,
    },

    /// Catalog data is malformed
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Render backend could not create or use a resource
    #[error("render backend failed: {0}")]
    Render(String),

    /// Contact form field failed validation
    #[error("{field} {reason}")]
    InvalidField {
        field: FormField,
        reason: &'static str,
    },

    /// Key name with no gallery binding
    #[error("unknown gallery key `{0}`")]
    UnknownKey(String),

    /// A submission is already waiting to complete
    #[error("submission already in progress")]
    SubmitInProgress,

    /// Animation definition error (bad trigger edge, toggle actions)
    #[error(transparent)]
    Animation(#[from] AnimationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for vitrine_site operations
pub type Result<T> = std::result::Result<T, SiteError>;
