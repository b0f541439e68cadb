//! WebDriver sessions over fantoccini

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{BrowserDriver, DriverError, DriverFactory, DriverResult};
use crate::config::{Browser, WebDriverConfig};
use crate::error::{EngineError, EngineResult};

/// Browser session connected to a WebDriver server
pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Start a new session on the server named in `config`
    pub async fn connect(config: &WebDriverConfig) -> EngineResult<Self> {
        info!(
            "Connecting to {} WebDriver at {}",
            config.browser.as_str(),
            config.url
        );

        let client = ClientBuilder::native()
            .capabilities(capabilities(config))
            .connect(&config.url)
            .await
            .map_err(|e| {
                EngineError::DriverLaunch(format!(
                    "cannot start a {} session at {}: {}",
                    config.browser.as_str(),
                    config.url,
                    e
                ))
            })?;

        // Window sizing is best-effort; some drivers refuse it in headless mode
        let sized = match (config.window_width, config.window_height) {
            (Some(width), Some(height)) => client.set_window_size(width, height).await,
            _ if config.maximize => client.maximize_window().await,
            _ => Ok(()),
        };
        if let Err(e) = sized {
            debug!("Could not size browser window: {}", e);
        }

        Ok(Self { client })
    }

    /// Underlying fantoccini client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn capabilities(config: &WebDriverConfig) -> serde_json::Map<String, Value> {
    let mut caps = serde_json::Map::new();
    let args = config.browser_args();

    match config.browser {
        Browser::Chrome => {
            caps.insert("browserName".to_string(), json!("chrome"));
            caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        }
        Browser::Firefox => {
            caps.insert("browserName".to_string(), json!("firefox"));
            caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
        }
    }

    caps
}

fn element_arg(element: &Element) -> DriverResult<Value> {
    serde_json::to_value(element).map_err(|e| DriverError::Script(e.to_string()))
}

fn lookup_error(xpath: &str, e: CmdError) -> DriverError {
    if e.is_no_such_element() {
        DriverError::NoSuchElement(xpath.to_string())
    } else {
        DriverError::Session(e.to_string())
    }
}

#[async_trait]
impl BrowserDriver for WebDriverSession {
    type Element = Element;

    async fn navigate(&self, url: &str) -> DriverResult<()> {
        debug!("Navigating to {}", url);
        self.client
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation(format!("{}: {}", url, e)))
    }

    async fn back(&self) -> DriverResult<()> {
        self.client
            .back()
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))
    }

    async fn current_url(&self) -> DriverResult<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(|e| DriverError::Session(e.to_string()))
    }

    async fn execute(&self, script: &str) -> DriverResult<Value> {
        self.client
            .execute(script, Vec::new())
            .await
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn execute_with(&self, script: &str, element: &Element) -> DriverResult<Value> {
        self.client
            .execute(script, vec![element_arg(element)?])
            .await
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn find(&self, xpath: &str) -> DriverResult<Element> {
        self.client
            .find(Locator::XPath(xpath))
            .await
            .map_err(|e| lookup_error(xpath, e))
    }

    async fn find_all(&self, xpath: &str) -> DriverResult<Vec<Element>> {
        self.client
            .find_all(Locator::XPath(xpath))
            .await
            .map_err(|e| lookup_error(xpath, e))
    }

    async fn click(&self, element: &Element) -> DriverResult<()> {
        element
            .click()
            .await
            .map_err(|e| DriverError::Interaction(e.to_string()))
    }

    async fn text(&self, element: &Element) -> DriverResult<String> {
        element
            .text()
            .await
            .map_err(|e| DriverError::Interaction(e.to_string()))
    }

    async fn tag_name(&self, element: &Element) -> DriverResult<String> {
        element
            .tag_name()
            .await
            .map_err(|e| DriverError::Interaction(e.to_string()))
    }

    async fn send_keys(&self, element: &Element, keys: &str) -> DriverResult<()> {
        element
            .send_keys(keys)
            .await
            .map_err(|e| DriverError::Interaction(e.to_string()))
    }

    async fn quit(&self) -> DriverResult<()> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| DriverError::Session(e.to_string()))
    }
}

/// Launches one [`WebDriverSession`] per call
#[derive(Debug, Clone, Default)]
pub struct WebDriverLauncher {
    config: WebDriverConfig,
}

impl WebDriverLauncher {
    pub fn new(config: WebDriverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WebDriverConfig {
        &self.config
    }
}

#[async_trait]
impl DriverFactory for WebDriverLauncher {
    type Driver = WebDriverSession;

    async fn launch(&self) -> EngineResult<WebDriverSession> {
        WebDriverSession::connect(&self.config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_capabilities() {
        let caps = capabilities(&WebDriverConfig::default());
        assert_eq!(caps["browserName"], "chrome");
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("--disable-notifications")));
    }

    #[test]
    fn test_firefox_capabilities() {
        let config = WebDriverConfig {
            browser: Browser::Firefox,
            headless: true,
            ..Default::default()
        };
        let caps = capabilities(&config);
        assert_eq!(caps["moz:firefoxOptions"]["args"], json!(["--headless"]));
        assert!(caps.get("goog:chromeOptions").is_none());
    }
}
