//! Login sequence shared by the recorder and the replay engine

use autotest_common::LoginCredentials;
use tracing::{info, warn};

use crate::config::Timings;
use crate::driver::{same_page, BrowserDriver, DriverError, RETURN_KEY};
use crate::error::{EngineError, EngineResult};
use crate::wait::poll_until;

pub const EMAIL_FIELD_XPATH: &str = "//input[@type='email' or @name='email']";
pub const PASSWORD_FIELD_XPATH: &str = "//input[@type='password' or @name='password']";

/// What happened when logging in. None of these stop the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials were submitted; no success marker is configured
    Submitted,
    /// Credentials were submitted and the success marker appeared
    Verified,
    /// Credentials were submitted but the success marker never appeared
    Unverified,
    /// The email or password input did not appear in time
    FieldsNotFound,
    /// The driver failed while typing or submitting
    Failed(String),
}

impl LoginOutcome {
    /// Whether the credentials reached the form
    pub fn submitted(&self) -> bool {
        matches!(
            self,
            LoginOutcome::Submitted | LoginOutcome::Verified | LoginOutcome::Unverified
        )
    }
}

/// Log in on `url` with `credentials`.
///
/// Never fails: a missing form or a driver error is logged and returned as
/// the outcome so the caller can carry on unauthenticated.
pub async fn login<D: BrowserDriver>(
    driver: &D,
    url: &str,
    credentials: &LoginCredentials,
    timings: &Timings,
    success_marker: Option<&str>,
) -> LoginOutcome {
    info!("Logging in at {} as {}", url, credentials.email);

    let outcome = match submit_credentials(driver, url, credentials, timings, success_marker).await {
        Ok(outcome) => outcome,
        Err(EngineError::LoginFieldsNotFound { millis }) => {
            warn!("Login form not found at {} within {}ms, continuing without login", url, millis);
            LoginOutcome::FieldsNotFound
        }
        Err(e) => {
            warn!("Error during login at {}: {}", url, e);
            LoginOutcome::Failed(e.to_string())
        }
    };

    match &outcome {
        LoginOutcome::Submitted => info!("Login submitted"),
        LoginOutcome::Verified => info!("Login verified"),
        LoginOutcome::Unverified => warn!("Login submitted but the success marker did not appear"),
        _ => {}
    }
    outcome
}

async fn submit_credentials<D: BrowserDriver>(
    driver: &D,
    url: &str,
    credentials: &LoginCredentials,
    timings: &Timings,
    success_marker: Option<&str>,
) -> EngineResult<LoginOutcome> {
    if !same_page(&driver.current_url().await?, url) {
        driver.navigate(url).await?;
    }

    let fields = poll_until(timings.login_fields(), timings.poll_interval(), move || async move {
        let Some(email) = find_optional(driver, EMAIL_FIELD_XPATH).await? else {
            return Ok(None);
        };
        let Some(password) = find_optional(driver, PASSWORD_FIELD_XPATH).await? else {
            return Ok(None);
        };
        Ok::<_, DriverError>(Some((email, password)))
    })
    .await?;

    let Some((email, password)) = fields else {
        return Err(EngineError::LoginFieldsNotFound {
            millis: timings.login_fields_ms,
        });
    };

    driver.send_keys(&email, &credentials.email).await?;
    driver.send_keys(&password, &credentials.password).await?;
    driver.send_keys(&password, RETURN_KEY).await?;

    let Some(marker) = success_marker else {
        return Ok(LoginOutcome::Submitted);
    };

    let found = poll_until(timings.login_fields(), timings.poll_interval(), move || async move {
        find_optional(driver, marker).await
    })
    .await?;

    Ok(if found.is_some() {
        LoginOutcome::Verified
    } else {
        LoginOutcome::Unverified
    })
}

async fn find_optional<D: BrowserDriver>(driver: &D, xpath: &str) -> Result<Option<D::Element>, DriverError> {
    match driver.find(xpath).await {
        Ok(element) => Ok(Some(element)),
        Err(DriverError::NoSuchElement(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
