use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Search API endpoint and transport tuning.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ApiSettings {
    pub base_url: String,
    pub search_path: String,
    pub timeout_secs: u64,
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// First backoff delay; doubles on each further retry.
    pub retry_delay_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://thedyrt.com".to_string(),
            search_path: "/api/v2/campgrounds/".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), SettingsError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SettingsError::Invalid {
                field: "api.base_url",
                reason: format!("{:?} is not an http(s) URL", self.base_url),
            });
        }
        if !self.search_path.starts_with('/') {
            return Err(SettingsError::Invalid {
                field: "api.search_path",
                reason: "must start with '/'".to_string(),
            });
        }
        Ok(())
    }
}
