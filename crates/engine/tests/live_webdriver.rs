use autotest_common::{ProfileStore, Status};
use autotest_engine::{
    DriverFactory, EngineConfig, Recorder, RecordingSession, ReplayEngine, WebDriverConfig, WebDriverLauncher,
};
use tempfile::TempDir;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<body>
  <nav>
    <a href="javascript:void(0)">Home</a>
    <a href="javascript:void(0)">About</a>
    <a href="javascript:void(0)"></a>
  </nav>
  <button id="buy" onclick="this.textContent = 'Bought'">Buy</button>
</body>
</html>
"#;

/// Live WebDriver Smoke Test
///
/// Records a local page through a real browser, then replays it and expects
/// every case to pass.
///
/// Marked ignored because it needs a WebDriver server, e.g. `chromedriver
/// --port=9515`, or the URL in AUTOTEST_WEBDRIVER_URL.
#[tokio::test]
#[ignore]
async fn record_then_replay_local_page() {
    let webdriver = WebDriverConfig {
        url: std::env::var("AUTOTEST_WEBDRIVER_URL").unwrap_or_else(|_| "http://localhost:9515".to_string()),
        headless: true,
        ..WebDriverConfig::default()
    };
    let launcher = WebDriverLauncher::new(webdriver);

    let tmp = TempDir::new().unwrap();
    let page = tmp.path().join("index.html");
    std::fs::write(&page, PAGE).unwrap();
    let url = format!("file://{}", page.display());

    let store = ProfileStore::new(tmp.path().join("data")).await.unwrap();
    let mut config = EngineConfig::default();
    config.timings.scroll_pace_ms = 50;
    config.timings.click_navigation_ms = 500;

    let driver = match launcher.launch().await {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("Skipping: no WebDriver server available ({e})");
            return;
        }
    };
    let recorder = Recorder::new(store.clone(), "local", config.clone()).unwrap();
    let summary = recorder
        .record(&mut RecordingSession::new(), &driver, &url, None)
        .await
        .unwrap();
    autotest_engine::BrowserDriver::quit(&driver).await.unwrap();

    assert_eq!(summary.elements_found, 4);
    assert_eq!(summary.total_cases, 5);
    assert!(summary
        .profile
        .test_cases
        .iter()
        .any(|case| case.expected_output().starts_with("Unnamed A")));

    let engine = ReplayEngine::new(store, launcher, config);
    let rows = engine.replay("local").await.unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|row| row.status == Status::Pass), "{rows:?}");
}
