//! Core types for AutoTest

use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Expected output recorded for every scroll probe
pub const SCROLL_EXPECTED_OUTPUT: &str = "Page scrolled up and down successfully";

/// Credentials used by the login sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Structural reference used to re-find a DOM element on a later page load.
///
/// Either an id shortcut (`id("main-nav")`) or an absolute sibling-index
/// path (`/html/body/div[2]/a`). Both forms are valid XPath expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Build the id shortcut form
    pub fn for_id(id: &str) -> Self {
        Self(format!("id(\"{}\")", id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_id_shortcut(&self) -> bool {
        self.0.starts_with("id(")
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Action kind of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Scroll,
    Click,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Scroll => write!(f, "scroll"),
            Action::Click => write!(f, "click"),
        }
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "scroll" => Ok(Action::Scroll),
            "click" => Ok(Action::Click),
            other => Err(format!("unknown action: {}", other)),
        }
    }
}

/// A recorded test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestCase {
    /// Scroll the page down and back up
    Scroll { url: String, expected_output: String },

    /// Click the element found at `element_xpath`
    Click {
        url: String,
        element_xpath: Locator,
        expected_output: String,
    },
}

impl TestCase {
    pub fn scroll(url: impl Into<String>) -> Self {
        TestCase::Scroll {
            url: url.into(),
            expected_output: SCROLL_EXPECTED_OUTPUT.to_string(),
        }
    }

    pub fn click(url: impl Into<String>, locator: Locator, expected_output: impl Into<String>) -> Self {
        TestCase::Click {
            url: url.into(),
            element_xpath: locator,
            expected_output: expected_output.into(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            TestCase::Scroll { url, .. } | TestCase::Click { url, .. } => url,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            TestCase::Scroll { .. } => Action::Scroll,
            TestCase::Click { .. } => Action::Click,
        }
    }

    pub fn locator(&self) -> Option<&Locator> {
        match self {
            TestCase::Scroll { .. } => None,
            TestCase::Click { element_xpath, .. } => Some(element_xpath),
        }
    }

    pub fn expected_output(&self) -> &str {
        match self {
            TestCase::Scroll { expected_output, .. } | TestCase::Click { expected_output, .. } => {
                expected_output
            }
        }
    }
}

/// Granularity of the click-case dedup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupScope {
    /// A locator is unique across every page of the site
    #[default]
    Locator,
    /// A locator is unique per recorded url
    UrlAndLocator,
}

/// Persisted login credentials and test cases for one site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Key of the profile in the store; not part of the file body
    #[serde(skip)]
    pub site_name: String,

    #[serde(default, with = "credentials_or_empty")]
    pub login_credentials: Option<LoginCredentials>,

    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

impl SiteProfile {
    /// Empty profile used on the first recording session for a site
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            ..Default::default()
        }
    }

    pub fn has_scroll_probe(&self) -> bool {
        self.test_cases
            .iter()
            .any(|tc| matches!(tc, TestCase::Scroll { .. }))
    }

    pub fn click_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.test_cases
            .iter()
            .filter(|tc| matches!(tc, TestCase::Click { .. }))
    }

    /// Append `candidate` unless an equivalent case already exists.
    ///
    /// Returns whether the case was added. Only one scroll probe is kept per
    /// profile; click cases are keyed by locator, or by (url, locator) under
    /// [`DedupScope::UrlAndLocator`].
    pub fn upsert_case(&mut self, candidate: TestCase, scope: DedupScope) -> bool {
        let duplicate = match &candidate {
            TestCase::Scroll { .. } => self.has_scroll_probe(),
            TestCase::Click { url, element_xpath, .. } => self.test_cases.iter().any(|tc| match tc {
                TestCase::Click {
                    url: existing_url,
                    element_xpath: existing,
                    ..
                } => {
                    existing == element_xpath
                        && (scope == DedupScope::Locator || existing_url == url)
                }
                TestCase::Scroll { .. } => false,
            }),
        };

        if duplicate {
            return false;
        }
        self.test_cases.push(candidate);
        true
    }
}

mod credentials_or_empty {
    //! `login_credentials` is written as `{}` when absent.

    use super::LoginCredentials;
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    struct Partial {
        email: Option<String>,
        password: Option<String>,
    }

    pub fn serialize<S: Serializer>(
        value: &Option<LoginCredentials>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(credentials) => credentials.serialize(serializer),
            None => serializer.serialize_map(Some(0))?.end(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<LoginCredentials>, D::Error> {
        match Option::<Partial>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Partial { email: None, password: None }) => Ok(None),
            Some(Partial {
                email: Some(email),
                password: Some(password),
            }) => Ok(Some(LoginCredentials { email, password })),
            Some(_) => Err(D::Error::custom(
                "login_credentials needs both email and password",
            )),
        }
    }
}

/// Outcome of one executed test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pass,
    Fail,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Pass => write!(f, "Pass"),
            Status::Fail => write!(f, "Fail"),
        }
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Pass" => Ok(Status::Pass),
            "Fail" => Ok(Status::Fail),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// One row of the replay report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub locator: Option<Locator>,
    pub action: Action,
    pub status: Status,
    /// Failure message; logged but not written to the report file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ReportRow {
    /// Row for `case` stamped with the current local time
    pub fn now(case: &TestCase, status: Status, detail: Option<String>) -> Self {
        let now = Local::now();
        Self {
            date: now.date_naive(),
            time: now.time().with_nanosecond(0).unwrap_or_else(|| now.time()),
            locator: case.locator().cloned(),
            action: case.action(),
            status,
            detail,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == Status::Pass
    }

    /// Locator column value
    pub fn locator_or_na(&self) -> &str {
        self.locator.as_ref().map(Locator::as_str).unwrap_or("N/A")
    }
}

/// Derive a site name from the host of `url`.
///
/// Uses the first host label, skipping a leading `www`, so
/// `https://www.shop.example.com/cart` becomes `shop`. IP hosts keep every
/// octet, joined with `-`.
pub fn site_name_from_url(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let name = match parsed.host() {
        Some(url::Host::Domain(domain)) => {
            let mut labels = domain.split('.').filter(|l| !l.is_empty());
            let first = labels.next().unwrap_or_default();
            match labels.next() {
                Some(second) if first.eq_ignore_ascii_case("www") => second.to_string(),
                _ => first.to_string(),
            }
        }
        Some(url::Host::Ipv4(addr)) => addr.to_string().replace('.', "-"),
        Some(url::Host::Ipv6(addr)) => addr.to_string().replace(':', "-"),
        None => String::new(),
    };

    validate_site_name(&name).map_err(|_| Error::InvalidUrl {
        url: url.to_string(),
        reason: "URL has no usable host".to_string(),
    })?;
    Ok(name.to_lowercase())
}

/// Reject site names that cannot be used as a file-name stem
pub fn validate_site_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(Error::InvalidSiteName(name.to_string()));
    }
    Ok(())
}
