//! CLI Commands

pub mod cases;
pub mod generate;
pub mod report;
pub mod run;
pub mod schedule;

use anyhow::Result;
use autotest_common::{validate_site_name, ProfileStore};
use autotest_engine::WebDriverLauncher;

use crate::config::AutotestConfig;
use crate::output::OutputFormat;

/// Settings shared by every command
pub struct Context {
    pub config: AutotestConfig,
    pub format: OutputFormat,
}

impl Context {
    pub async fn store(&self) -> Result<ProfileStore> {
        Ok(ProfileStore::new(&self.config.data_dir).await?)
    }

    pub fn launcher(&self) -> WebDriverLauncher {
        WebDriverLauncher::new(self.config.webdriver.clone())
    }
}

/// Clap value parser rejecting blank input
pub fn non_empty(value: &str) -> std::result::Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("value must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

/// Clap value parser rejecting blank input but keeping the value verbatim
pub fn non_blank(value: &str) -> std::result::Result<String, String> {
    if value.trim().is_empty() {
        return Err("value must not be blank".to_string());
    }
    Ok(value.to_string())
}

/// Clap value parser for `--site`
pub fn site_name(value: &str) -> std::result::Result<String, String> {
    let name = non_empty(value)?;
    validate_site_name(&name).map_err(|e| e.to_string())?;
    Ok(name)
}

/// Clap value parser for page URLs
pub fn page_url(value: &str) -> std::result::Result<String, String> {
    let value = non_empty(value)?;
    let parsed = url::Url::parse(&value).map_err(|e| format!("invalid URL: {}", e))?;
    match parsed.scheme() {
        "http" | "https" | "file" => Ok(value),
        other => Err(format!("unsupported URL scheme: {}", other)),
    }
}
