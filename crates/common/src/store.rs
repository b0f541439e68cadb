//! Test-case store
//!
//! One JSON document per site, holding its login credentials and recorded
//! test cases:
//! - Missing files load as an empty profile
//! - Writes go through a temp file and a rename
//! - Read-modify-write cycles are serialized per site with [`ProfileStore::lock`]

use crate::error::{Error, Result};
use crate::report::ReportSink;
use crate::types::{validate_site_name, SiteProfile};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Directory-backed store of site profiles
#[derive(Debug, Clone)]
pub struct ProfileStore {
    root: PathBuf,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ProfileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;

        debug!("Opened test-case store at {:?}", root);

        Ok(Self {
            root,
            locks: Arc::new(DashMap::new()),
        })
    }

    /// Get the root path of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the test-case file for `site_name`
    pub fn profile_path(&self, site_name: &str) -> Result<PathBuf> {
        validate_site_name(site_name)?;
        Ok(self.root.join(format!("{}_testcases.json", site_name)))
    }

    /// Path of the report file for `site_name`
    pub fn report_path(&self, site_name: &str) -> Result<PathBuf> {
        validate_site_name(site_name)?;
        Ok(self.root.join(format!("{}_test_reports.csv", site_name)))
    }

    /// Take the per-site writer lock.
    ///
    /// Hold the guard across load, mutate and save so two writers in this
    /// process cannot interleave and drop each other's cases.
    pub async fn lock(&self, site_name: &str) -> OwnedMutexGuard<()> {
        self.named_lock(&format!("profile:{}", site_name)).lock_owned().await
    }

    fn named_lock(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Check whether a profile has been saved for `site_name`
    pub async fn exists(&self, site_name: &str) -> bool {
        match self.profile_path(site_name) {
            Ok(path) => fs::metadata(path).await.is_ok(),
            Err(_) => false,
        }
    }

    /// Load the profile for `site_name`, or an empty one on first use
    pub async fn load(&self, site_name: &str) -> Result<SiteProfile> {
        let path = self.profile_path(site_name)?;

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No test cases stored for {}, starting empty", site_name);
                return Ok(SiteProfile::new(site_name));
            }
            Err(e) => return Err(e.into()),
        };

        let mut profile: SiteProfile =
            serde_json::from_str(&content).map_err(|e| Error::CorruptProfile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        profile.site_name = site_name.to_string();

        debug!(
            "Loaded {} test case(s) for {}",
            profile.test_cases.len(),
            site_name
        );
        Ok(profile)
    }

    /// Persist `profile`, replacing any previous copy in one rename
    pub async fn save(&self, profile: &SiteProfile) -> Result<()> {
        let path = self.profile_path(&profile.site_name)?;
        let json = serde_json::to_string_pretty(profile)?;

        let tmp_path = self.root.join(format!(
            ".{}_testcases.json.{}.{}.tmp",
            profile.site_name,
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp_path, json).await?;
        if let Err(e) = fs::rename(&tmp_path, &path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        info!(
            "Saved {} test case(s) for {} to {}",
            profile.test_cases.len(),
            profile.site_name,
            path.display()
        );
        Ok(())
    }

    /// Report sink for `site_name`, sharing this store's lock registry
    pub fn report_sink(&self, site_name: &str) -> Result<ReportSink> {
        let path = self.report_path(site_name)?;
        let lock = self.named_lock(&format!("report:{}", site_name));
        Ok(ReportSink::with_lock(path, lock))
    }
}
