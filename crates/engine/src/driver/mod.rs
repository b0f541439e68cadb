//! Browser driver boundary
//!
//! The engine only talks to a browser through [`BrowserDriver`]. The
//! WebDriver implementation lives in [`webdriver`]; sessions are created by a
//! [`DriverFactory`] so the replay engine can open a fresh one per pass.

pub mod webdriver;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::error::EngineResult;

pub use webdriver::{WebDriverLauncher, WebDriverSession};

/// WebDriver key code for the Return key
pub const RETURN_KEY: &str = "\u{E006}";

#[derive(Error, Debug, Clone)]
pub enum DriverError {
    #[error("no element matches {0}")]
    NoSuchElement(String),

    #[error("script failed: {0}")]
    Script(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("element interaction failed: {0}")]
    Interaction(String),

    #[error("session error: {0}")]
    Session(String),
}

pub type DriverResult<T> = Result<T, DriverError>;

/// One live browser session.
///
/// Not safe for concurrent use by two dispatchers; callers drive a session
/// from a single task.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Handle to an element of the current page
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// Go one step back in the session history
    async fn back(&self) -> DriverResult<()>;

    async fn current_url(&self) -> DriverResult<String>;

    /// Run `script` in the page and return its result
    async fn execute(&self, script: &str) -> DriverResult<Value>;

    /// Run `script` with `element` bound to `arguments[0]`
    async fn execute_with(&self, script: &str, element: &Self::Element) -> DriverResult<Value>;

    /// First element matching `xpath`, or [`DriverError::NoSuchElement`]
    async fn find(&self, xpath: &str) -> DriverResult<Self::Element>;

    async fn find_all(&self, xpath: &str) -> DriverResult<Vec<Self::Element>>;

    async fn click(&self, element: &Self::Element) -> DriverResult<()>;

    /// Visible text of `element`
    async fn text(&self, element: &Self::Element) -> DriverResult<String>;

    async fn tag_name(&self, element: &Self::Element) -> DriverResult<String>;

    async fn send_keys(&self, element: &Self::Element, keys: &str) -> DriverResult<()>;

    /// End the session and close the browser
    async fn quit(&self) -> DriverResult<()>;
}

/// Opens browser sessions
#[async_trait]
pub trait DriverFactory: Send + Sync {
    type Driver: BrowserDriver + 'static;

    async fn launch(&self) -> EngineResult<Self::Driver>;
}

/// Compare two URLs the way a browser reports them, so `https://a.test`
/// and `https://a.test/` are the same page
pub fn same_page(a: &str, b: &str) -> bool {
    match (url::Url::parse(a), url::Url::parse(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
