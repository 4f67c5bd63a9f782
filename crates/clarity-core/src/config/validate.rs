//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.service.process_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service.process_url must not be empty".into(),
            ));
        }
        if self.service.result_url_base.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service.result_url_base must not be empty".into(),
            ));
        }
        if self.service.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "service.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.enhancement.width == 0 {
            return Err(ConfigError::ValidationError(
                "enhancement.width must be > 0".into(),
            ));
        }
        if self.enhancement.enhancements.is_empty() {
            return Err(ConfigError::ValidationError(
                "enhancement.enhancements must list at least one pass".into(),
            ));
        }
        Ok(())
    }
}
