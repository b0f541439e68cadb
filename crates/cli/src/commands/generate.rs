//! Record test cases from live pages

use anyhow::{Context as _, Result};
use autotest_common::{site_name_from_url, LoginCredentials};
use autotest_engine::{BrowserDriver, DriverFactory, Recorder, RecordingSession, RecordingSummary};
use clap::Args;
use tracing::warn;

use super::{non_blank, page_url, site_name, Context};
use crate::output::{print_list, print_success, print_warning};

#[derive(Args)]
pub struct GenerateArgs {
    /// Page to record; repeat to record several pages in one session
    #[arg(long = "url", required = true, value_parser = page_url)]
    pub urls: Vec<String>,

    /// Site name (default: first label of the first URL's host)
    #[arg(long, value_parser = site_name)]
    pub site: Option<String>,

    /// Login email, submitted before recording
    #[arg(long, requires = "password", value_parser = non_blank)]
    pub email: Option<String>,

    /// Login password, typed exactly as given
    #[arg(long, requires = "email", value_parser = non_blank)]
    pub password: Option<String>,
}

impl GenerateArgs {
    fn credentials(&self) -> Option<LoginCredentials> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some(LoginCredentials::new(email, password)),
            _ => None,
        }
    }

    fn site_name(&self) -> Result<String> {
        match &self.site {
            Some(site) => Ok(site.clone()),
            None => Ok(site_name_from_url(&self.urls[0])?),
        }
    }
}

pub async fn execute(args: GenerateArgs, ctx: &Context) -> Result<()> {
    let site = args.site_name()?;
    let credentials = args.credentials();
    let store = ctx.store().await?;
    let recorder = Recorder::new(store, site.clone(), ctx.config.engine_config())?;

    let driver = ctx
        .launcher()
        .launch()
        .await
        .context("starting browser session")?;

    let mut session = RecordingSession::new();
    let mut summaries: Vec<RecordingSummary> = Vec::with_capacity(args.urls.len());
    let mut failure = None;

    for url in &args.urls {
        match recorder.record(&mut session, &driver, url, credentials.as_ref()).await {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                failure = Some(anyhow::Error::new(e).context(format!("recording {}", url)));
                break;
            }
        }
    }

    if let Err(e) = driver.quit().await {
        warn!("Failed to close browser session: {}", e);
    }

    if let Some(outcome) = session.login_outcome() {
        if !outcome.submitted() {
            print_warning(&format!("Login did not complete ({:?}); recorded without it", outcome));
        }
    }

    print_list(&summaries, ctx.format);

    if let Some(e) = failure {
        return Err(e);
    }

    let total = summaries.last().map(|s| s.total_cases).unwrap_or_default();
    let added: usize = summaries.iter().map(|s| s.cases_added).sum();
    print_success(&format!(
        "Recorded {} new test case(s) for '{}' ({} stored)",
        added, site, total
    ));
    Ok(())
}
