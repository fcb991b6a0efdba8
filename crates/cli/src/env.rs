use crate::error::CliError;
use std::{collections::HashMap, fs, path::Path};
use tracing::debug;

pub const DEFAULT_ENV_FILE: &str = ".env";

/// Process environment merged with an optional `.env` file.
///
/// File values win over the process environment, matching how the settings
/// are documented for local runs.
#[derive(Debug, Clone)]
pub struct EnvManager {
    vars: HashMap<String, String>,
    sensitive_patterns: Vec<String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
            sensitive_patterns: Self::default_sensitive_patterns(),
        }
    }

    /// Loads `path` when given (it must exist), otherwise `.env` if present.
    pub fn load(path: Option<&str>) -> Result<Self, CliError> {
        let mut env = Self::new();
        match path {
            Some(path) => env.load_from_file(path)?,
            None if Path::new(DEFAULT_ENV_FILE).is_file() => env.load_from_file(DEFAULT_ENV_FILE)?,
            None => {}
        }
        Ok(env)
    }

    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)?;
        debug!(path = %path.display(), "Loaded env file");
        Ok(())
    }

    pub fn all(&self) -> &HashMap<String, String> {
        &self.vars
    }

    /// Value for log output, masked when the key looks like a secret.
    pub fn display_value(&self, key: &str) -> Option<String> {
        let value = self.vars.get(key)?;
        let lower = key.to_ascii_lowercase();
        if self.sensitive_patterns.iter().any(|p| lower.contains(p.as_str())) {
            Some("****".to_string())
        } else {
            Some(value.clone())
        }
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars.insert(key.to_string(), Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();

        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }

        value.to_string()
    }

    fn default_sensitive_patterns() -> Vec<String> {
        ["password", "passwd", "secret", "token", "db_url", "database_url", "auth"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for EnvManager {
    fn default() -> Self {
        Self::new()
    }
}
