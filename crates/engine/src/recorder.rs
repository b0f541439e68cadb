//! Test-case recorder
//!
//! Loads a page, optionally logs in, and turns every clickable element into a
//! click case. Recording the same unchanged page again adds nothing.

use autotest_common::{validate_site_name, LoginCredentials, ProfileStore, SiteProfile, TestCase};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::driver::BrowserDriver;
use crate::error::{EngineError, EngineResult};
use crate::locator::synthesize;
use crate::login::{login, LoginOutcome};
use crate::wait::poll_until;

/// Elements with a click handler, plus every link and button
pub const CLICKABLE_XPATH: &str = "//*[@onclick or self::button or self::a]";

pub const READY_STATE_SCRIPT: &str = "return document.readyState;";

/// Login state of one recording session.
///
/// Credentials are submitted at most once per session, however many pages
/// are recorded with it.
#[derive(Debug, Default)]
pub struct RecordingSession {
    logged_in: bool,
    login_outcome: Option<LoginOutcome>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the login sequence has already run in this session
    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn login_outcome(&self) -> Option<&LoginOutcome> {
        self.login_outcome.as_ref()
    }
}

/// Result of one `record` call
#[derive(Debug, Clone, Serialize)]
pub struct RecordingSummary {
    pub site_name: String,
    pub url: String,
    /// Clickable elements found on the page
    pub elements_found: usize,
    /// New test cases, the scroll probe included
    pub cases_added: usize,
    /// Elements skipped because they could not be described
    pub elements_skipped: usize,
    pub total_cases: usize,
    #[serde(skip)]
    pub profile: SiteProfile,
}

/// Records test cases for one site into the store
pub struct Recorder {
    store: ProfileStore,
    site_name: String,
    config: EngineConfig,
}

impl Recorder {
    pub fn new(store: ProfileStore, site_name: impl Into<String>, config: EngineConfig) -> EngineResult<Self> {
        let site_name = site_name.into();
        validate_site_name(&site_name)?;
        Ok(Self {
            store,
            site_name,
            config,
        })
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// Record every clickable element of `url` into the site's profile.
    ///
    /// Fails with [`EngineError::PageLoadTimeout`] before touching the
    /// profile if the page never finishes loading. Elements that cannot be
    /// described are logged and skipped.
    pub async fn record<D: BrowserDriver>(
        &self,
        session: &mut RecordingSession,
        driver: &D,
        url: &str,
        credentials: Option<&LoginCredentials>,
    ) -> EngineResult<RecordingSummary> {
        let _guard = self.store.lock(&self.site_name).await;
        let mut profile = self.store.load(&self.site_name).await?;
        let scope = self.config.recording.dedup_scope;

        info!("Opening {}", url);
        driver.navigate(url).await?;

        if let Some(credentials) = credentials {
            profile.login_credentials = Some(credentials.clone());
            if !session.logged_in {
                let outcome = login(
                    driver,
                    url,
                    credentials,
                    &self.config.timings,
                    self.config.login.success_marker.as_deref(),
                )
                .await;
                session.logged_in = true;
                session.login_outcome = Some(outcome);
            }
        }

        self.wait_for_page_load(driver, url).await?;

        let mut cases_added = 0;
        if profile.upsert_case(TestCase::scroll(url), scope) {
            cases_added += 1;
            info!("Generated test case for scrolling");
        }

        let elements = driver.find_all(CLICKABLE_XPATH).await?;
        debug!("Found {} clickable element(s)", elements.len());

        let mut elements_skipped = 0;
        for element in &elements {
            match describe(driver, url, element).await {
                Ok(case) => {
                    let description = case.expected_output().to_string();
                    let locator = case.locator().map(|l| l.to_string()).unwrap_or_default();
                    if profile.upsert_case(case, scope) {
                        cases_added += 1;
                        info!("Generated test case for {}, locator {}", description, locator);
                    }
                }
                Err(e) => {
                    elements_skipped += 1;
                    warn!("Error generating test case for element: {}", e);
                }
            }
        }

        self.store.save(&profile).await?;
        info!(
            "Recorded {} new test case(s) for {} ({} total)",
            cases_added,
            self.site_name,
            profile.test_cases.len()
        );

        Ok(RecordingSummary {
            site_name: self.site_name.clone(),
            url: url.to_string(),
            elements_found: elements.len(),
            cases_added,
            elements_skipped,
            total_cases: profile.test_cases.len(),
            profile,
        })
    }

    async fn wait_for_page_load<D: BrowserDriver>(&self, driver: &D, url: &str) -> EngineResult<()> {
        let timings = &self.config.timings;

        // Script errors while the document is being replaced count as "not yet"
        let ready = poll_until(timings.page_load(), timings.poll_interval(), move || async move {
            let complete = match driver.execute(READY_STATE_SCRIPT).await {
                Ok(state) => state.as_str() == Some("complete"),
                Err(e) => {
                    debug!("readyState probe failed: {}", e);
                    false
                }
            };
            Ok::<_, EngineError>(complete.then_some(()))
        })
        .await?;

        ready.ok_or_else(|| EngineError::PageLoadTimeout {
            url: url.to_string(),
            millis: timings.page_load_ms,
        })
    }
}

/// Build the click case for one element
async fn describe<D: BrowserDriver>(driver: &D, url: &str, element: &D::Element) -> EngineResult<TestCase> {
    let locator = synthesize(driver, element).await?;
    let tag = driver.tag_name(element).await?.to_lowercase();
    let text = driver.text(element).await?;

    let label = match text.trim() {
        "" => format!("Unnamed {}", capitalize(&tag)),
        trimmed => trimmed.to_string(),
    };

    Ok(TestCase::click(url, locator, format!("{} ({})", label, tag)))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timings;
    use crate::driver::fake::{FakeDriver, FakeElement, FakePage};
    use tempfile::TempDir;

    const URL: &str = "https://shop.test/";

    fn config() -> EngineConfig {
        EngineConfig {
            timings: Timings {
                page_load_ms: 40,
                login_fields_ms: 20,
                poll_interval_ms: 5,
                ..Timings::default()
            },
            ..EngineConfig::default()
        }
    }

    fn three_links() -> FakePage {
        FakePage::new(vec![
            FakeElement::link("Home", &[("html", 1), ("body", 1), ("nav", 1), ("a", 1)]),
            FakeElement::link("  About us ", &[("html", 1), ("body", 1), ("nav", 1), ("a", 2)]),
            FakeElement::link("", &[("html", 1), ("body", 1), ("nav", 1), ("a", 3)]),
            FakeElement::new("p", "Not clickable", &[("html", 1), ("body", 1), ("p", 1)]),
        ])
    }

    async fn recorder(tmp: &TempDir) -> (ProfileStore, Recorder) {
        let store = ProfileStore::new(tmp.path()).await.unwrap();
        let recorder = Recorder::new(store.clone(), "shop", config()).unwrap();
        (store, recorder)
    }

    #[tokio::test]
    async fn test_records_links_and_scroll_probe() {
        let tmp = TempDir::new().unwrap();
        let (store, recorder) = recorder(&tmp).await;
        let driver = FakeDriver::new().with_page(URL, three_links());

        let summary = recorder
            .record(&mut RecordingSession::new(), &driver, URL, None)
            .await
            .unwrap();
        assert_eq!(summary.elements_found, 3);
        assert_eq!(summary.cases_added, 4);

        let profile = store.load("shop").await.unwrap();
        assert_eq!(profile.test_cases.len(), 4);
        assert!(profile.has_scroll_probe());

        let outputs: Vec<&str> = profile.click_cases().map(|c| c.expected_output()).collect();
        assert_eq!(outputs[0], "Home (a)");
        assert_eq!(outputs[1], "About us (a)");
        assert!(outputs[2].starts_with("Unnamed A"));
        assert_eq!(
            profile.test_cases[3].locator().unwrap().as_str(),
            "/html/body/nav/a[3]"
        );
    }

    #[tokio::test]
    async fn test_second_pass_adds_nothing() {
        let tmp = TempDir::new().unwrap();
        let (store, recorder) = recorder(&tmp).await;
        let driver = FakeDriver::new().with_page(URL, three_links());
        let mut session = RecordingSession::new();

        recorder.record(&mut session, &driver, URL, None).await.unwrap();
        let first = store.load("shop").await.unwrap().test_cases.len();

        let summary = recorder.record(&mut session, &driver, URL, None).await.unwrap();
        assert_eq!(summary.cases_added, 0);
        assert_eq!(store.load("shop").await.unwrap().test_cases.len(), first);
    }

    #[tokio::test]
    async fn test_locator_failure_skips_only_that_element() {
        let tmp = TempDir::new().unwrap();
        let (store, recorder) = recorder(&tmp).await;
        let page = FakePage::new(vec![
            FakeElement::link("Gone", &[("html", 1), ("body", 1), ("a", 1)]).detached(),
            FakeElement::new("button", "Buy", &[("html", 1), ("body", 1), ("button", 1)]).with_id("buy"),
            FakeElement::new("span", "", &[("html", 1), ("body", 1), ("span", 1)]).with_onclick(),
        ]);
        let driver = FakeDriver::new().with_page(URL, page);

        let summary = recorder
            .record(&mut RecordingSession::new(), &driver, URL, None)
            .await
            .unwrap();
        assert_eq!(summary.elements_skipped, 1);

        let profile = store.load("shop").await.unwrap();
        let locators: Vec<String> = profile.click_cases().map(|c| c.locator().unwrap().to_string()).collect();
        assert_eq!(locators, vec!["id(\"buy\")", "/html/body/span"]);
        assert_eq!(profile.test_cases[2].expected_output(), "Unnamed Span (span)");
    }

    #[tokio::test]
    async fn test_page_load_timeout_leaves_profile_untouched() {
        let tmp = TempDir::new().unwrap();
        let (store, recorder) = recorder(&tmp).await;
        let driver = FakeDriver::new().with_page(URL, FakePage::loading_forever());

        let err = recorder
            .record(&mut RecordingSession::new(), &driver, URL, None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::PageLoadTimeout { .. }));
        assert!(!store.exists("shop").await);
    }

    #[tokio::test]
    async fn test_login_runs_once_per_session() {
        let tmp = TempDir::new().unwrap();
        let (store, recorder) = recorder(&tmp).await;
        let mut page = three_links();
        page.elements.push(FakeElement::input("email", &[("html", 1), ("body", 1), ("input", 1)]));
        page.elements.push(FakeElement::input("password", &[("html", 1), ("body", 1), ("input", 2)]));
        let driver = FakeDriver::new().with_page(URL, page);
        let creds = LoginCredentials::new("qa@shop.test", "pw");
        let mut session = RecordingSession::new();

        recorder.record(&mut session, &driver, URL, Some(&creds)).await.unwrap();
        recorder.record(&mut session, &driver, URL, Some(&creds)).await.unwrap();

        assert!(session.logged_in());
        assert_eq!(session.login_outcome(), Some(&LoginOutcome::Submitted));
        // email, password, return
        assert_eq!(driver.state().keys.len(), 3);
        assert_eq!(store.load("shop").await.unwrap().login_credentials, Some(creds));
    }

    #[tokio::test]
    async fn test_missing_login_form_still_records() {
        let tmp = TempDir::new().unwrap();
        let (store, recorder) = recorder(&tmp).await;
        let driver = FakeDriver::new().with_page(URL, three_links());
        let creds = LoginCredentials::new("qa@shop.test", "pw");
        let mut session = RecordingSession::new();

        recorder.record(&mut session, &driver, URL, Some(&creds)).await.unwrap();
        assert_eq!(session.login_outcome(), Some(&LoginOutcome::FieldsNotFound));
        assert_eq!(store.load("shop").await.unwrap().test_cases.len(), 4);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("a"), "A");
        assert_eq!(capitalize("button"), "Button");
        assert_eq!(capitalize(""), "");
    }
}
