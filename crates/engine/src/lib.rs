//! AutoTest record/replay engine
//!
//! This crate drives a real browser over WebDriver to:
//! - Record every clickable element of a page as a test case
//! - Replay stored test cases and append pass/fail rows to the site report
//! - Log in with stored credentials before recording or replaying
//! - Repeat replays on a fixed interval
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   AutoTest Engine (Rust)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Recorder                                                   │
//! │    └── record(session, driver, url, creds?) -> Summary      │
//! │          ├── login()          (once per RecordingSession)   │
//! │          ├── wait readyState == "complete"                  │
//! │          └── synthesize() per clickable -> TestCase         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ReplayEngine<F: DriverFactory>                             │
//! │    └── replay(site) -> [ReportRow]                          │
//! │          ├── login()          (once per pass)               │
//! │          ├── scroll probe     (5 down, 5 up)                │
//! │          └── click case       (back if the page changed)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scheduler::spawn(engine, site, interval) -> ScheduleHandle │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserDriver  <──  WebDriverSession (fantoccini)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod locator;
pub mod login;
pub mod recorder;
pub mod replay;
pub mod scheduler;
pub mod wait;

pub use config::{Browser, EngineConfig, LoginConfig, RecordingConfig, Timings, WebDriverConfig};
pub use driver::{BrowserDriver, DriverError, DriverFactory, WebDriverLauncher, WebDriverSession};
pub use error::{EngineError, EngineResult};
pub use login::{login, LoginOutcome};
pub use recorder::{Recorder, RecordingSession, RecordingSummary};
pub use replay::{CaseState, ReplayEngine, ReplaySummary};
pub use scheduler::{ScheduleHandle, Scheduler};
