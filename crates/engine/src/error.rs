//! Error types for the record/replay engine

use thiserror::Error;

use crate::driver::DriverError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Page {url} did not finish loading within {millis}ms")]
    PageLoadTimeout { url: String, millis: u64 },

    #[error("Cannot build locator: {0}")]
    Locator(String),

    #[error("Login fields not found within {millis}ms")]
    LoginFieldsNotFound { millis: u64 },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Failed to launch browser session: {0}")]
    DriverLaunch(String),

    #[error("Driver error: {0}")]
    Driver(DriverError),

    #[error("Store error: {0}")]
    Store(#[from] autotest_common::Error),
}

impl From<DriverError> for EngineError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::NoSuchElement(query) => EngineError::ElementNotFound(query),
            other => EngineError::Driver(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
