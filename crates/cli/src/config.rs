//! CLI configuration file

use anyhow::Context;
use autotest_engine::{EngineConfig, LoginConfig, RecordingConfig, Timings, WebDriverConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutotestConfig {
    /// Directory holding test-case and report files
    pub data_dir: PathBuf,

    /// WebDriver connection and browser launch options
    pub webdriver: WebDriverConfig,

    pub timings: Timings,

    pub recording: RecordingConfig,

    pub login: LoginConfig,
}

impl Default for AutotestConfig {
    fn default() -> Self {
        Self {
            data_dir: autotest_common::default_store_path(),
            webdriver: WebDriverConfig::default(),
            timings: Timings::default(),
            recording: RecordingConfig::default(),
            login: LoginConfig::default(),
        }
    }
}

impl AutotestConfig {
    /// Load configuration from file, or defaults if it does not exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Self = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Settings handed to the recorder and replay engine
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            timings: self.timings.clone(),
            recording: self.recording.clone(),
            login: self.login.clone(),
        }
    }
}
