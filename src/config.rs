use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::{debug, info};

/// Base name of the optional config file (`vacinadash.toml`, `.yaml` or `.json`).
const CONFIG_FILE: &str = "vacinadash";
const ENV_PREFIX: &str = "VACINADASH";

/// Application configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Analytics backend base URL, e.g. `http://localhost:8000`
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Supply name mapping file for `normalize-supply`
    #[serde(default)]
    pub mappings_path: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    /// Loads `.env`, the optional config file and `VACINADASH_*` variables, in
    /// that order of increasing precedence.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_sources(file, Environment::with_prefix(ENV_PREFIX))
    }

    /// Layers `env` over the config file. An explicit file must exist; the
    /// default `vacinadash.*` file is optional.
    fn from_sources(file: Option<&Path>, env: Environment) -> Result<Self> {
        let builder = match file {
            Some(path) => {
                debug!("Using config file {}", path.display());
                Config::builder().add_source(File::from(path).required(true))
            }
            None => Config::builder().add_source(File::with_name(CONFIG_FILE).required(false)),
        };
        let settings = builder
            .add_source(env)
            .build()
            .context("Failed to read configuration")?;

        let app_config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        info!("Configuration loaded (backend: {:?})", app_config.api_base_url);
        Ok(app_config)
    }

    /// Applies command line overrides.
    pub fn with_overrides(mut self, api_base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(url) = api_base_url {
            self.api_base_url = url;
        }
        if let Some(secs) = timeout_secs {
            self.request_timeout_secs = secs;
        }
        self
    }

    /// The backend URL, failing when none is configured.
    pub fn base_url(&self) -> Result<&str> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            bail!("API base URL is not configured; set {}_API_BASE_URL or pass --api-base-url", ENV_PREFIX);
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
