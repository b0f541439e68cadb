//! AutoTest Common Library
//!
//! Data model, test-case store and report sink shared by the engine and
//! the command-line interface.

pub mod error;
pub mod report;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use report::{ReportSink, REPORT_HEADERS};
pub use store::ProfileStore;
pub use types::*;

/// AutoTest version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default data directory for test-case and report files
pub fn default_store_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".autotest")
}

/// Default configuration file path
pub fn default_config_path() -> std::path::PathBuf {
    default_store_path().join("config.toml")
}

/// Home directory helper
mod dirs {
    pub fn home_dir() -> Option<std::path::PathBuf> {
        std::env::var_os("HOME").map(std::path::PathBuf::from)
    }
}
