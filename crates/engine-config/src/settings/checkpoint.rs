use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointBackend {
    /// JSON document, atomically replaced on every save.
    #[default]
    File,
    /// Embedded sled database.
    Sled,
}

impl FromStr for CheckpointBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(CheckpointBackend::File),
            "sled" => Ok(CheckpointBackend::Sled),
            other => Err(format!("unknown checkpoint backend '{other}' (expected file or sled)")),
        }
    }
}

impl fmt::Display for CheckpointBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointBackend::File => f.write_str("file"),
            CheckpointBackend::Sled => f.write_str("sled"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CheckpointSettings {
    pub backend: CheckpointBackend,
    /// File path for the file backend, database directory for sled.
    pub path: String,
}

impl Default for CheckpointSettings {
    fn default() -> Self {
        Self {
            backend: CheckpointBackend::File,
            path: "scraper_checkpoint.json".to_string(),
        }
    }
}
