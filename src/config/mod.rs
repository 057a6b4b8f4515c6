//! Engine configuration.
//!
//! Loaded from environment variables with the `DIALOG_CORE` prefix and
//! `__` as the nesting separator, e.g.
//! `DIALOG_CORE__MAX_DISPLAY=4` or
//! `DIALOG_CORE__SUSPENDED_FORM_TTL_MINUTES=15`.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables of the decision core.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of CTAs presented per turn.
    #[serde(default = "default_max_display")]
    pub max_display: usize,

    /// How long a suspended form stays resumable.
    #[serde(default = "default_suspended_form_ttl")]
    pub suspended_form_ttl_minutes: i64,

    /// How long an idle session context is retained.
    #[serde(default = "default_session_idle_ttl")]
    pub session_idle_ttl_minutes: i64,
}

fn default_max_display() -> usize {
    3
}

fn default_suspended_form_ttl() -> i64 {
    30
}

fn default_session_idle_ttl() -> i64 {
    1440
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_display: default_max_display(),
            suspended_form_ttl_minutes: default_suspended_form_ttl(),
            session_idle_ttl_minutes: default_session_idle_ttl(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the environment, falling back to defaults.
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        let config: Self = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DIALOG_CORE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_display == 0 {
            return Err(SettingsError::Invalid(
                "max_display must be at least 1".to_string(),
            ));
        }
        if self.suspended_form_ttl_minutes <= 0 {
            return Err(SettingsError::Invalid(
                "suspended_form_ttl_minutes must be positive".to_string(),
            ));
        }
        if self.session_idle_ttl_minutes < self.suspended_form_ttl_minutes {
            return Err(SettingsError::Invalid(
                "session_idle_ttl_minutes must not be shorter than the suspended form TTL"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.max_display, 3);
        assert_eq!(config.suspended_form_ttl_minutes, 30);
        assert_eq!(config.session_idle_ttl_minutes, 1440);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_max_display_is_rejected() {
        let config = EngineConfig {
            max_display: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn session_ttl_shorter_than_form_ttl_is_rejected() {
        let config = EngineConfig {
            suspended_form_ttl_minutes: 60,
            session_idle_ttl_minutes: 30,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
