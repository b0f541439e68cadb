//! Replay engine
//!
//! Runs every stored test case of a site in order against a fresh browser
//! session and appends one report row per case as soon as it finishes.

use autotest_common::{
    validate_site_name, Locator, ProfileStore, ReportRow, ReportSink, SiteProfile, Status, TestCase,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::driver::{BrowserDriver, DriverError, DriverFactory};
use crate::error::EngineResult;
use crate::login::login;
use crate::wait::poll_until;

pub const SCROLL_DOWN_SCRIPT: &str = "window.scrollBy(0, window.innerHeight / 5);";
pub const SCROLL_UP_SCRIPT: &str = "window.scrollBy(0, -window.innerHeight / 5);";

/// Scroll steps in each direction
pub const SCROLL_STEPS: usize = 5;

/// Lifecycle of one test case during a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseState {
    Pending,
    Executing,
    Passed {
        /// The click left the page and the engine navigated back
        navigated: bool,
    },
    Failed {
        reason: String,
    },
}

impl CaseState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaseState::Passed { .. } | CaseState::Failed { .. })
    }

    /// Report row for a terminal state
    fn to_row(&self, case: &TestCase) -> Option<ReportRow> {
        match self {
            CaseState::Passed { .. } => Some(ReportRow::now(case, Status::Pass, None)),
            CaseState::Failed { reason } => Some(ReportRow::now(case, Status::Fail, Some(reason.clone()))),
            CaseState::Pending | CaseState::Executing => None,
        }
    }
}

/// Totals for one replay pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub site_name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

impl ReplaySummary {
    pub fn from_rows(site_name: &str, rows: &[ReportRow], duration_ms: u64) -> Self {
        let passed = rows.iter().filter(|row| row.passed()).count();
        Self {
            site_name: site_name.to_string(),
            total: rows.len(),
            passed,
            failed: rows.len() - passed,
            duration_ms,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Replays stored test cases through sessions opened by `F`
pub struct ReplayEngine<F: DriverFactory> {
    store: ProfileStore,
    factory: F,
    config: EngineConfig,
}

impl<F: DriverFactory> ReplayEngine<F> {
    pub fn new(store: ProfileStore, factory: F, config: EngineConfig) -> Self {
        Self {
            store,
            factory,
            config,
        }
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Run one pass over every test case of `site_name`.
    ///
    /// Returns one row per case in case order. A site without test cases
    /// returns no rows and never opens a browser.
    pub async fn replay(&self, site_name: &str) -> EngineResult<Vec<ReportRow>> {
        validate_site_name(site_name)?;
        let profile = self.store.load(site_name).await?;

        if profile.test_cases.is_empty() {
            info!("No test cases to run for {}", site_name);
            return Ok(Vec::new());
        }

        let sink = self.store.report_sink(site_name)?;
        let start = Instant::now();
        info!("Running {} test case(s) for {}", profile.test_cases.len(), site_name);

        let driver = self.factory.launch().await?;
        let result = self.run_cases(&driver, &profile, &sink).await;

        if let Err(e) = driver.quit().await {
            warn!("Failed to close browser session: {}", e);
        }

        let rows = result?;
        let summary = ReplaySummary::from_rows(site_name, &rows, start.elapsed().as_millis() as u64);
        info!(
            "Test Results for {}: {} passed, {} failed ({} ms)",
            site_name, summary.passed, summary.failed, summary.duration_ms
        );
        Ok(rows)
    }

    /// Execute `profile`'s cases on an open session, appending each row to
    /// `sink` before the next case starts
    pub async fn run_cases<D: BrowserDriver>(
        &self,
        driver: &D,
        profile: &SiteProfile,
        sink: &ReportSink,
    ) -> EngineResult<Vec<ReportRow>> {
        if let (Some(credentials), Some(first)) = (&profile.login_credentials, profile.test_cases.first()) {
            let outcome = login(
                driver,
                first.url(),
                credentials,
                &self.config.timings,
                self.config.login.success_marker.as_deref(),
            )
            .await;
            if !outcome.submitted() {
                warn!("Continuing replay of {} without login", profile.site_name);
            }
        }

        // Url the engine last navigated to; None forces the next case to load
        let mut loaded: Option<String> = None;
        let mut rows = Vec::with_capacity(profile.test_cases.len());

        for case in &profile.test_cases {
            let mut state = CaseState::Pending;
            advance(&mut state, CaseState::Executing, case);

            let started = Instant::now();
            let finished = match self.execute(driver, case, &mut loaded).await {
                Ok(navigated) => CaseState::Passed { navigated },
                Err(e) => {
                    loaded = None;
                    CaseState::Failed { reason: e.to_string() }
                }
            };
            advance(&mut state, finished, case);

            match &state {
                CaseState::Passed { navigated } => {
                    info!("✓ {} ({} ms)", case.expected_output(), started.elapsed().as_millis());
                    if *navigated {
                        debug!("Returned to {} after the click", case.url());
                    }
                }
                CaseState::Failed { reason } => error!("✗ {} - {}", case.expected_output(), reason),
                _ => {}
            }

            if let Some(row) = state.to_row(case) {
                sink.append(std::slice::from_ref(&row)).await?;
                rows.push(row);
            }
        }

        Ok(rows)
    }

    /// Run one case; `Ok(true)` when a click navigated away and was undone
    async fn execute<D: BrowserDriver>(
        &self,
        driver: &D,
        case: &TestCase,
        loaded: &mut Option<String>,
    ) -> EngineResult<bool> {
        if loaded.as_deref() != Some(case.url()) {
            driver.navigate(case.url()).await?;
            *loaded = Some(case.url().to_string());
        }

        match case {
            TestCase::Scroll { .. } => {
                self.scroll(driver).await?;
                Ok(false)
            }
            TestCase::Click { element_xpath, .. } => self.click(driver, element_xpath).await,
        }
    }

    async fn scroll<D: BrowserDriver>(&self, driver: &D) -> EngineResult<()> {
        let pace = self.config.timings.scroll_pace();
        for script in [SCROLL_DOWN_SCRIPT, SCROLL_UP_SCRIPT] {
            for _ in 0..SCROLL_STEPS {
                driver.execute(script).await?;
                sleep(pace).await;
            }
        }
        Ok(())
    }

    async fn click<D: BrowserDriver>(&self, driver: &D, locator: &Locator) -> EngineResult<bool> {
        let timings = &self.config.timings;
        let element = driver.find(locator.as_str()).await?;
        let before = driver.current_url().await?;

        driver.click(&element).await?;

        let origin = before.as_str();
        let landed = poll_until(timings.click_navigation(), timings.poll_interval(), move || async move {
            let now = driver.current_url().await?;
            Ok::<_, DriverError>((now != origin).then_some(now))
        })
        .await?;

        let Some(landed) = landed else {
            return Ok(false);
        };

        debug!("Click on {} opened {}, going back", locator, landed);
        driver.back().await?;
        if driver.current_url().await? != before {
            debug!("History did not return to {}, reloading it", before);
            driver.navigate(&before).await?;
        }
        Ok(true)
    }
}

fn advance(state: &mut CaseState, next: CaseState, case: &TestCase) {
    debug!("{} case on {}: {:?} -> {:?}", case.action(), case.url(), state, next);
    *state = next;
}
