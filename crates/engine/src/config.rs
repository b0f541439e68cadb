//! Engine configuration

use autotest_common::DedupScope;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser reached through the WebDriver server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Browser::Chrome),
            "firefox" => Ok(Browser::Firefox),
            other => Err(format!("unsupported browser: {}", other)),
        }
    }
}

/// Configuration for launching a WebDriver session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebDriverConfig {
    /// WebDriver server URL (chromedriver, geckodriver, selenium)
    pub url: String,

    /// Browser to request from the server
    pub browser: Browser,

    /// Run without a visible window
    pub headless: bool,

    /// Maximize the window once the session starts
    pub maximize: bool,

    /// Fixed window size, applied instead of maximizing
    pub window_width: Option<u32>,
    pub window_height: Option<u32>,

    /// Extra browser command-line arguments
    pub extra_args: Vec<String>,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9515".to_string(),
            browser: Browser::Chrome,
            headless: false,
            maximize: true,
            window_width: None,
            window_height: None,
            extra_args: Vec::new(),
        }
    }
}

impl WebDriverConfig {
    /// Browser arguments, including the popup/notification suppression every
    /// session gets
    pub fn browser_args(&self) -> Vec<String> {
        let mut args = match self.browser {
            Browser::Chrome => vec![
                "--disable-popup-blocking".to_string(),
                "--disable-notifications".to_string(),
                "--disable-infobars".to_string(),
            ],
            Browser::Firefox => Vec::new(),
        };

        if self.headless {
            match self.browser {
                Browser::Chrome => {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                }
                Browser::Firefox => args.push("--headless".to_string()),
            }
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }
}

/// Bounds and pacing for every wait the engine performs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Wait for `document.readyState == "complete"` while recording
    pub page_load_ms: u64,

    /// Wait for the URL to change after a replayed click
    pub click_navigation_ms: u64,

    /// Wait for the login inputs (and the success marker, if configured)
    pub login_fields_ms: u64,

    /// Pause after each step of the scroll probe
    pub scroll_pace_ms: u64,

    /// Interval between polls of a bounded wait
    pub poll_interval_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            page_load_ms: 20_000,
            click_navigation_ms: 5_000,
            login_fields_ms: 10_000,
            scroll_pace_ms: 1_000,
            poll_interval_ms: 250,
        }
    }
}

impl Timings {
    pub fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load_ms)
    }

    pub fn click_navigation(&self) -> Duration {
        Duration::from_millis(self.click_navigation_ms)
    }

    pub fn login_fields(&self) -> Duration {
        Duration::from_millis(self.login_fields_ms)
    }

    pub fn scroll_pace(&self) -> Duration {
        Duration::from_millis(self.scroll_pace_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Recorder settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Granularity of the click-case dedup key
    pub dedup_scope: DedupScope,
}

/// Login sequence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// XPath of an element that only exists once logged in. When set, login
    /// waits for it and reports whether it appeared.
    pub success_marker: Option<String>,
}

/// Everything the recorder and replay engine need besides a driver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timings: Timings,
    pub recording: RecordingConfig,
    pub login: LoginConfig,
}
