//! In-memory browser for engine tests.
//!
//! Pages are keyed by URL and hold a flat list of elements with a fixed
//! ancestry. XPath queries are answered for the handful of expressions the
//! engine issues; everything else matches by synthesized locator.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{BrowserDriver, DriverError, DriverFactory, DriverResult};
use crate::error::{EngineError, EngineResult};
use crate::locator::{ElementAncestry, PathStep, ANCESTRY_SCRIPT};
use crate::login::{EMAIL_FIELD_XPATH, PASSWORD_FIELD_XPATH};
use crate::recorder::{CLICKABLE_XPATH, READY_STATE_SCRIPT};

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeElement {
    pub tag: String,
    pub text: String,
    pub id: Option<String>,
    pub path: Vec<(String, u32)>,
    pub onclick: bool,
    pub input_type: Option<String>,
    pub detached: bool,
    pub navigates_to: Option<String>,
    /// Intermediate history entry pushed before `navigates_to`
    pub redirects_via: Option<String>,
    pub click_error: Option<String>,
}

impl FakeElement {
    pub fn new(tag: &str, text: &str, path: &[(&str, u32)]) -> Self {
        Self {
            tag: tag.to_string(),
            text: text.to_string(),
            path: path.iter().map(|(t, n)| (t.to_string(), *n)).collect(),
            ..Default::default()
        }
    }

    pub fn link(text: &str, path: &[(&str, u32)]) -> Self {
        Self::new("a", text, path)
    }

    pub fn input(input_type: &str, path: &[(&str, u32)]) -> Self {
        Self {
            input_type: Some(input_type.to_string()),
            ..Self::new("input", "", path)
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_onclick(mut self) -> Self {
        self.onclick = true;
        self
    }

    pub fn navigating_to(mut self, url: &str) -> Self {
        self.navigates_to = Some(url.to_string());
        self
    }

    /// Click lands on `target` after passing through `hop`, leaving two history entries
    pub fn redirecting_to(mut self, hop: &str, target: &str) -> Self {
        self.redirects_via = Some(hop.to_string());
        self.navigates_to = Some(target.to_string());
        self
    }

    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    pub fn failing_click(mut self, reason: &str) -> Self {
        self.click_error = Some(reason.to_string());
        self
    }

    fn ancestry(&self) -> ElementAncestry {
        ElementAncestry {
            id: self.id.clone().unwrap_or_default(),
            attached: !self.detached,
            path: self
                .path
                .iter()
                .map(|(tag, n)| PathStep::new(tag.clone(), *n))
                .collect(),
        }
    }

    /// Locator the engine would synthesize for this element
    pub fn locator(&self) -> String {
        self.ancestry()
            .to_locator()
            .map(|l| l.to_string())
            .unwrap_or_default()
    }

    fn clickable(&self) -> bool {
        self.onclick || self.tag == "a" || self.tag == "button"
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakePage {
    pub elements: Vec<FakeElement>,
    pub ready: bool,
}

impl FakePage {
    pub fn new(elements: Vec<FakeElement>) -> Self {
        Self {
            elements,
            ready: true,
        }
    }

    pub fn loading_forever() -> Self {
        Self {
            elements: Vec::new(),
            ready: false,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    pub pages: HashMap<String, FakePage>,
    pub history: Vec<String>,
    pub navigations: Vec<String>,
    pub back_calls: usize,
    pub scripts: Vec<String>,
    pub clicks: Vec<String>,
    pub keys: Vec<(String, String)>,
    pub quit: bool,
}

impl FakeState {
    fn current(&self) -> String {
        self.history
            .last()
            .cloned()
            .unwrap_or_else(|| "about:blank".to_string())
    }

    fn element(&self, handle: &FakeHandle) -> DriverResult<&FakeElement> {
        self.pages
            .get(&handle.url)
            .and_then(|page| page.elements.get(handle.index))
            .ok_or_else(|| DriverError::Interaction("stale element reference".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FakeHandle {
    url: String,
    index: usize,
}

/// Shares its state with every clone, so tests can inspect a session after
/// handing it to the engine
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeDriver {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, url: &str, page: FakePage) -> Self {
        self.state().pages.insert(url.to_string(), page);
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn matching(&self, xpath: &str) -> Vec<FakeHandle> {
        let state = self.state();
        let url = state.current();
        let Some(page) = state.pages.get(&url) else {
            return Vec::new();
        };

        page.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| match xpath {
                CLICKABLE_XPATH => el.clickable(),
                EMAIL_FIELD_XPATH => !el.detached && el.input_type.as_deref() == Some("email"),
                PASSWORD_FIELD_XPATH => !el.detached && el.input_type.as_deref() == Some("password"),
                other => !el.detached && el.locator() == other,
            })
            .map(|(index, _)| FakeHandle {
                url: url.clone(),
                index,
            })
            .collect()
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    type Element = FakeHandle;

    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state();
        state.navigations.push(url.to_string());
        state.history.push(url.to_string());
        Ok(())
    }

    async fn back(&self) -> DriverResult<()> {
        let mut state = self.state();
        state.back_calls += 1;
        if state.history.len() > 1 {
            state.history.pop();
        }
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.state().current())
    }

    async fn execute(&self, script: &str) -> DriverResult<Value> {
        let mut state = self.state();
        state.scripts.push(script.to_string());
        if script == READY_STATE_SCRIPT {
            let ready = state
                .pages
                .get(&state.current())
                .map(|page| page.ready)
                .unwrap_or(true);
            return Ok(json!(if ready { "complete" } else { "loading" }));
        }
        Ok(Value::Null)
    }

    async fn execute_with(&self, script: &str, element: &FakeHandle) -> DriverResult<Value> {
        let state = self.state();
        let element = state.element(element)?;
        if script != ANCESTRY_SCRIPT {
            return Ok(Value::Null);
        }
        Ok(json!({
            "id": element.id.clone().unwrap_or_default(),
            "attached": !element.detached,
            "path": element
                .path
                .iter()
                .map(|(tag, ordinal)| json!({ "tag": tag, "ordinal": ordinal }))
                .collect::<Vec<_>>(),
        }))
    }

    async fn find(&self, xpath: &str) -> DriverResult<FakeHandle> {
        self.matching(xpath)
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement(xpath.to_string()))
    }

    async fn find_all(&self, xpath: &str) -> DriverResult<Vec<FakeHandle>> {
        Ok(self.matching(xpath))
    }

    async fn click(&self, element: &FakeHandle) -> DriverResult<()> {
        let mut state = self.state();
        let el = state.element(element)?.clone();
        state.clicks.push(el.locator());
        if let Some(reason) = el.click_error {
            return Err(DriverError::Interaction(reason));
        }
        if let Some(hop) = el.redirects_via {
            state.history.push(hop);
        }
        if let Some(target) = el.navigates_to {
            state.history.push(target);
        }
        Ok(())
    }

    async fn text(&self, element: &FakeHandle) -> DriverResult<String> {
        Ok(self.state().element(element)?.text.clone())
    }

    async fn tag_name(&self, element: &FakeHandle) -> DriverResult<String> {
        Ok(self.state().element(element)?.tag.clone())
    }

    async fn send_keys(&self, element: &FakeHandle, keys: &str) -> DriverResult<()> {
        let mut state = self.state();
        let el = state.element(element)?;
        let target = el.input_type.clone().unwrap_or_else(|| el.tag.clone());
        state.keys.push((target, keys.to_string()));
        Ok(())
    }

    async fn quit(&self) -> DriverResult<()> {
        self.state().quit = true;
        Ok(())
    }
}

/// Hands out clones of one [`FakeDriver`] and counts launches
#[derive(Debug, Default)]
pub(crate) struct FakeFactory {
    pub driver: FakeDriver,
    pub launches: AtomicUsize,
    pub refuse: bool,
}

impl FakeFactory {
    pub fn new(driver: FakeDriver) -> Self {
        Self {
            driver,
            ..Default::default()
        }
    }

    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Default::default()
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DriverFactory for FakeFactory {
    type Driver = FakeDriver;

    async fn launch(&self) -> EngineResult<FakeDriver> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return Err(EngineError::DriverLaunch("connection refused".to_string()));
        }
        Ok(self.driver.clone())
    }
}
