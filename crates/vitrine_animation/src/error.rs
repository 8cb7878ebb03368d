//! Animation error types

use thiserror::Error;

/// Errors raised while building animations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A scroll-trigger edge such as `"top 80%"` could not be parsed
    #[error("invalid trigger edge `{0}`")]
    InvalidEdge(String),

    /// A toggle-actions string such as `"play none none reverse"` could not be parsed
    #[error("invalid toggle actions `{0}`")]
    InvalidToggleActions(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
