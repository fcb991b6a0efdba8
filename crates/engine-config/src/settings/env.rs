use crate::{
    error::SettingsError,
    settings::{CheckpointBackend, CrawlSettings},
};
use std::{collections::HashMap, str::FromStr};

pub const ENV_PREFIX: &str = "GRIDCRAWL_";
pub const DB_URL: &str = "DB_URL";

impl CrawlSettings {
    /// Overrides fields from environment variables.
    ///
    /// `vars` is usually the process environment merged with a `.env` file.
    /// Recognised keys are `DB_URL` and `GRIDCRAWL_*` (see [`ENV_KEYS`]).
    /// Empty values are ignored.
    pub fn apply_env(&mut self, vars: &HashMap<String, String>) -> Result<(), SettingsError> {
        let get = |suffix: &str| {
            vars.get(&format!("{ENV_PREFIX}{suffix}"))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(|v| (format!("{ENV_PREFIX}{suffix}"), v.to_string()))
        };

        if let Some(url) = vars.get(DB_URL).map(|v| v.trim()).filter(|v| !v.is_empty()) {
            self.database_url = url.to_string();
        }

        if let Some((k, v)) = get("GRID_SIZE") {
            self.grid_size = parse(&k, &v)?;
        }
        if let Some((k, v)) = get("PER_PAGE") {
            self.per_page = parse(&k, &v)?;
        }
        if let Some((k, v)) = get("MAX_PAGES") {
            self.max_pages_per_cell = parse(&k, &v)?;
        }
        if let Some((k, v)) = get("PAGE_DELAY_MS") {
            self.page_delay_ms = parse(&k, &v)?;
        }
        if let Some((k, v)) = get("RESUME") {
            self.resume = parse_bool(&k, &v)?;
        }
        if let Some((_, v)) = get("API_BASE_URL") {
            self.api.base_url = v;
        }
        if let Some((_, v)) = get("API_SEARCH_PATH") {
            self.api.search_path = v;
        }
        if let Some((k, v)) = get("API_TIMEOUT_SECS") {
            self.api.timeout_secs = parse(&k, &v)?;
        }
        if let Some((k, v)) = get("API_MAX_RETRIES") {
            self.api.max_retries = parse(&k, &v)?;
        }
        if let Some((k, v)) = get("API_RETRY_DELAY_MS") {
            self.api.retry_delay_ms = parse(&k, &v)?;
        }
        if let Some((k, v)) = get("CHECKPOINT_BACKEND") {
            self.checkpoint.backend = parse::<CheckpointBackend>(&k, &v)?;
        }
        if let Some((_, v)) = get("CHECKPOINT_PATH") {
            self.checkpoint.path = v;
        }
        if let Some((_, v)) = get("REJECTED_ITEMS_PATH") {
            self.rejected_items_path = Some(v);
        }

        Ok(())
    }
}

/// Every variable [`CrawlSettings::apply_env`] reads.
pub const ENV_KEYS: &[&str] = &[
    DB_URL,
    "GRIDCRAWL_GRID_SIZE",
    "GRIDCRAWL_PER_PAGE",
    "GRIDCRAWL_MAX_PAGES",
    "GRIDCRAWL_PAGE_DELAY_MS",
    "GRIDCRAWL_RESUME",
    "GRIDCRAWL_API_BASE_URL",
    "GRIDCRAWL_API_SEARCH_PATH",
    "GRIDCRAWL_API_TIMEOUT_SECS",
    "GRIDCRAWL_API_MAX_RETRIES",
    "GRIDCRAWL_API_RETRY_DELAY_MS",
    "GRIDCRAWL_CHECKPOINT_BACKEND",
    "GRIDCRAWL_CHECKPOINT_PATH",
    "GRIDCRAWL_REJECTED_ITEMS_PATH",
];

fn parse<T>(key: &str, value: &str) -> Result<T, SettingsError>
where
    T: FromStr,
    T::Err: ToString,
{
    value.parse().map_err(|e: T::Err| SettingsError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidEnv {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
