//! Sub-configuration structs with defaults matching the Deep-Image service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote enhancement service endpoints and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Endpoint that accepts processing requests
    pub process_url: String,

    /// Base URL for job status lookups (`<base>/<job_id>`)
    pub result_url_base: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,

    /// Per-request HTTP timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            process_url: "https://deep-image.ai/rest_api/process_result".to_string(),
            result_url_base: "https://deep-image.ai/rest_api/result".to_string(),
            api_key: "${DEEP_IMAGE_API_KEY}".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Polling behavior for asynchronous jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Highest attempt index still allowed to query the service
    pub max_retries: u32,

    /// Delay between status checks in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_retries: 20,
            retry_delay_ms: 3000,
        }
    }
}

impl PollingConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Options sent with every processing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementOptions {
    /// Enhancement passes to apply
    pub enhancements: Vec<String>,

    /// Target output width in pixels
    pub width: u32,
}

impl Default for EnhancementOptions {
    fn default() -> Self {
        Self {
            enhancements: vec![
                "denoise".to_string(),
                "deblur".to_string(),
                "light".to_string(),
            ],
            width: 2000,
        }
    }
}

/// Output settings for the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
