//! Site configuration
//!
//! Loaded from `vitrine.toml`. Every field has a default, so an empty file
//! (or no file at all) yields the stock behavior:
//!
//! ```toml
//! desktop_breakpoint_px = 1024
//! idle_timeout_ms = 3000
//! initial_grace_ms = 2000
//! submit_delay_ms = 2000
//! pointer_smoothing = 0.05
//! reveal_duration_ms = 1500
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, SiteError};

/// Behavioral parameters for the site
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Minimum viewport width for desktop-only features (shader background)
    pub desktop_breakpoint_px: f32,
    /// Inactivity window after which hero content hides
    pub idle_timeout_ms: f64,
    /// Extra time added to the first idle window so the entrance can finish
    pub initial_grace_ms: f64,
    /// Simulated contact-form round trip
    pub submit_delay_ms: f64,
    /// Per-frame exponential smoothing factor for the shader's pointer
    pub pointer_smoothing: f32,
    /// Duration of the shader reveal from 0 to 1
    pub reveal_duration_ms: f32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            desktop_breakpoint_px: 1024.0,
            idle_timeout_ms: 3000.0,
            initial_grace_ms: 2000.0,
            submit_delay_ms: 2000.0,
            pointer_smoothing: 0.05,
            reveal_duration_ms: 1500.0,
        }
    }
}

impl SiteConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no site config, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> String {
        // Every field is a plain number, so serialization cannot fail
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        fn positive(field: &'static str, value: f64) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SiteError::InvalidConfig {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        }

        positive("desktop_breakpoint_px", self.desktop_breakpoint_px as f64)?;
        positive("idle_timeout_ms", self.idle_timeout_ms)?;
        positive("submit_delay_ms", self.submit_delay_ms)?;
        positive("reveal_duration_ms", self.reveal_duration_ms as f64)?;

        if !(self.initial_grace_ms.is_finite() && self.initial_grace_ms >= 0.0) {
            return Err(SiteError::InvalidConfig {
                field: "initial_grace_ms",
                reason: format!("must not be negative, got {}", self.initial_grace_ms),
            });
        }
        if !(self.pointer_smoothing > 0.0 && self.pointer_smoothing <= 1.0) {
            return Err(SiteError::InvalidConfig {
                field: "pointer_smoothing",
                reason: format!("must be in (0, 1], got {}", self.pointer_smoothing),
            });
        }
        Ok(())
    }

    /// Deadline of the first idle timer after mount
    pub fn first_idle_deadline_ms(&self) -> f64 {
        self.idle_timeout_ms + self.initial_grace_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = SiteConfig::from_toml_str("").unwrap();
        assert_eq!(config, SiteConfig::default());
        assert_eq!(config.first_idle_deadline_ms(), 5000.0);
    }

    #[test]
    fn test_partial_override() {
        let config = SiteConfig::from_toml_str("idle_timeout_ms = 4500\n").unwrap();
        assert_eq!(config.idle_timeout_ms, 4500.0);
        assert_eq!(config.desktop_breakpoint_px, 1024.0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = SiteConfig::from_toml_str("pointer_smoothing = 1.5").unwrap_err();
        assert!(matches!(
            err,
            SiteError::InvalidConfig {
                field: "pointer_smoothing",
                ..
            }
        ));
        assert!(SiteConfig::from_toml_str("idle_timeout_ms = 0").is_err());
        assert!(SiteConfig::from_toml_str("idle_timeout_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = SiteConfig {
            idle_timeout_ms: 1234.0,
            ..Default::default()
        };
        let parsed = SiteConfig::from_toml_str(&config.to_toml_string()).unwrap();
        assert_eq!(parsed, config);
    }
}
