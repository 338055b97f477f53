//! Tooltip configuration
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for the outside-click arming delay.
pub const MAX_DISMISS_DELAY_MS: u32 = 10_000;

/// Behavior knobs shared by every tooltip built from this config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TooltipConfig {
    /// Prefix for placement marker classes (`TooltipAbove`, `TooltipAlignLeft`, ...)
    #[serde(default = "TooltipConfig::default_class_prefix")]
    pub class_prefix: String,
    /// Delay before an outside-click dismissal listener is armed, so the click
    /// that opened the tooltip does not immediately close it
    #[serde(default = "TooltipConfig::default_dismiss_delay_ms")]
    pub dismiss_delay_ms: u32,
    /// Display value restored by `show()`
    #[serde(default = "TooltipConfig::default_shown_display")]
    pub shown_display: String,
}

impl TooltipConfig {
    fn default_class_prefix() -> String {
        "Tooltip".to_string()
    }

    const fn default_dismiss_delay_ms() -> u32 {
        50
    }

    fn default_shown_display() -> String {
        "block".to_string()
    }

    /// Parse and validate a config from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.class_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "class_prefix",
            });
        }
        if self.class_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Whitespace {
                field: "class_prefix",
                value: self.class_prefix.clone(),
            });
        }
        if self.shown_display.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "shown_display",
            });
        }
        if self.shown_display == "none" {
            return Err(ConfigError::HiddenShowDisplay);
        }
        if self.dismiss_delay_ms > MAX_DISMISS_DELAY_MS {
            return Err(ConfigError::DismissDelay {
                max: MAX_DISMISS_DELAY_MS,
                value: self.dismiss_delay_ms,
            });
        }
        Ok(())
    }
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            class_prefix: Self::default_class_prefix(),
            dismiss_delay_ms: Self::default_dismiss_delay_ms(),
            shown_display: Self::default_shown_display(),
        }
    }
}

/// Errors raised when tooltip configuration invariants are violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must not contain whitespace (got {value:?})")]
    Whitespace { field: &'static str, value: String },
    #[error("shown_display must not be \"none\"")]
    HiddenShowDisplay,
    #[error("dismiss_delay_ms must be at most {max} (got {value})")]
    DismissDelay { max: u32, value: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_takes_defaults() {
        let config = TooltipConfig::from_json("{}").unwrap();
        assert_eq!(config, TooltipConfig::default());
        assert_eq!(config.class_prefix, "Tooltip");
        assert_eq!(config.dismiss_delay_ms, 50);
        assert_eq!(config.shown_display, "block");
    }

    #[test]
    fn partial_json_overrides_fields() {
        let config =
            TooltipConfig::from_json(r#"{"class_prefix":"Tip","dismiss_delay_ms":0}"#).unwrap();
        assert_eq!(config.class_prefix, "Tip");
        assert_eq!(config.dismiss_delay_ms, 0);
        assert_eq!(config.shown_display, "block");
    }

    #[test]
    fn rejects_invalid_values() {
        let err = TooltipConfig::from_json(r#"{"class_prefix":"  "}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EmptyField {
                field: "class_prefix"
            }
        ));

        let err = TooltipConfig::from_json(r#"{"class_prefix":"my tip"}"#).unwrap_err();
        assert!(err.to_string().contains("whitespace"));

        let err = TooltipConfig::from_json(r#"{"dismiss_delay_ms":60000}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DismissDelay {
                max: MAX_DISMISS_DELAY_MS,
                value: 60_000
            }
        ));

        let err = TooltipConfig::from_json(r#"{"shown_display":"none"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::HiddenShowDisplay));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let err = TooltipConfig::from_json("{").unwrap_err();
        assert!(err.to_string().starts_with("JSON parsing error"));
    }
}
