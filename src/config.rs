use std::path::Path;

use config::{Config, File};
use serde::Deserialize;

use crate::error::{IngestError, Result};

/// Runtime settings loaded once at startup from a structured file
/// (`configs.json` by default).
///
/// `project_id` and `base_url` are required; the API keys are optional here
/// and enforced by the subcommand that needs them.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub project_id: String,
    pub base_url: String,

    #[serde(default)]
    pub collection_id: Option<String>,

    #[serde(default)]
    pub master_key: Option<String>,

    #[serde(default)]
    pub write_key: Option<String>,

    #[serde(default)]
    pub read_key: Option<String>,

    /// Skip TLS certificate verification on upstream fetches. Off unless
    /// the operator opts in.
    #[serde(default)]
    pub allow_invalid_certs: bool,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let loaded = Config::builder()
            .add_source(File::from(path))
            .build()
            .map_err(|e| IngestError::Config(e.to_string()))?;

        let mut settings: Settings = loaded
            .try_deserialize()
            .map_err(|e| IngestError::Config(e.to_string()))?;

        settings.base_url = settings.base_url.trim_end_matches('/').to_string();

        if settings.project_id.is_empty() {
            return Err(IngestError::Config("project_id must not be empty".to_string()));
        }
        if settings.base_url.is_empty() {
            return Err(IngestError::Config("base_url must not be empty".to_string()));
        }

        Ok(settings)
    }

    pub fn write_key(&self) -> Result<&str> {
        self.write_key
            .as_deref()
            .ok_or_else(|| IngestError::Config("write_key missing from configuration".to_string()))
    }

    pub fn master_key(&self) -> Result<&str> {
        self.master_key
            .as_deref()
            .ok_or_else(|| IngestError::Config("master_key missing from configuration".to_string()))
    }

    /// Collection id from the CLI override or the config file, in that order.
    pub fn collection_id<'a>(&'a self, override_id: Option<&'a str>) -> Result<&'a str> {
        override_id
            .or(self.collection_id.as_deref())
            .ok_or_else(|| {
                IngestError::Config(
                    "no collection id; set collection_id in the config or pass --collection"
                        .to_string(),
                )
            })
    }
}
