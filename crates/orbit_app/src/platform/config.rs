//! Application configuration.
//!
//! Values are layered, lowest precedence first: built-in defaults, the RON
//! file, `ORBIT_*` environment variables, command-line flags.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use orbit_engine::GenerateSettings;
use orbit_logging::orbit_debug;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const CONFIG_FILENAME: &str = "orbit.ron";
const INDEX_FILENAME: &str = "orbit.sqlite3";
const LOG_FILENAME: &str = "orbit.log";
const DOCUMENTS_DIRNAME: &str = "documents";

pub const ENV_BASE_URL: &str = "ORBIT_BASE_URL";
pub const ENV_MODEL: &str = "ORBIT_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub num_ctx: u32,
    pub request_timeout_secs: u64,
    pub data_dir: PathBuf,
    /// Where exported documents go. Defaults to `<data_dir>/documents`.
    pub output_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let generate = GenerateSettings::default();
        Self {
            base_url: generate.base_url,
            model: generate.model,
            temperature: 0.6,
            num_ctx: 4096,
            request_timeout_secs: generate.request_timeout.as_secs(),
            data_dir: default_data_dir(),
            output_dir: None,
        }
    }
}

/// Command-line values that take precedence over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl AppConfig {
    pub fn load(overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        Self::load_with_env(overrides, |key| std::env::var(key).ok())
    }

    pub fn load_with_env(
        overrides: &ConfigOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let mut config = match &overrides.config {
            Some(path) => Self::read_file(path)?,
            None => {
                let data_dir = overrides.data_dir.clone().unwrap_or_else(default_data_dir);
                let path = data_dir.join(CONFIG_FILENAME);
                if path.is_file() {
                    Self::read_file(&path)?
                } else {
                    orbit_debug!("No config file at {:?}; using defaults", path);
                    Self::default()
                }
            }
        };

        if let Some(base_url) = env(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url;
        }
        if let Some(model) = env(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            config.model = model;
        }

        if let Some(data_dir) = &overrides.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(base_url) = &overrides.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(model) = &overrides.model {
            config.model = model.clone();
        }

        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        ron::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.model.trim().is_empty(), "model name is empty");
        anyhow::ensure!(
            self.request_timeout_secs > 0,
            "request_timeout_secs must be positive"
        );
        self.generate_settings()
            .endpoint()
            .with_context(|| format!("invalid base_url '{}'", self.base_url))?;
        Ok(())
    }

    pub fn generate_settings(&self) -> GenerateSettings {
        GenerateSettings {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            options: json!({ "temperature": self.temperature, "num_ctx": self.num_ctx }),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..GenerateSettings::default()
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DOCUMENTS_DIRNAME))
    }

    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(INDEX_FILENAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILENAME)
    }
}

fn default_data_dir() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("orbit_data")
}
