//! Per-invocation application context.
//!
//! Everything a command handler needs travels in [`AppContext`]; there is no
//! process-wide state besides the logging guard.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use shotlist_core::core::settings::{AppSettings, SettingsManager};
use shotlist_core::core::storage::{ImageStore, ShotDb};

pub struct AppContext {
    data_dir: PathBuf,
    settings_manager: SettingsManager,
    pub settings: AppSettings,
    db: Option<ShotDb>,
}

impl AppContext {
    /// Loads settings from `data_dir`; the database is opened on first use
    pub fn new(data_dir: PathBuf) -> Self {
        let settings_manager = SettingsManager::new(data_dir.clone());
        let settings = settings_manager.load();
        Self {
            data_dir,
            settings_manager,
            settings,
            db: None,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn settings_manager(&self) -> &SettingsManager {
        &self.settings_manager
    }

    /// The shot database, opened lazily
    pub fn db(&mut self) -> Result<&ShotDb> {
        if self.db.is_none() {
            let path = self.settings.storage.database_path(&self.data_dir);
            let db = ShotDb::open(&path)
                .with_context(|| format!("opening shot database {}", path.display()))?;
            self.db = Some(db);
        }

        self.db
            .as_ref()
            .context("shot database unavailable after opening")
    }

    pub fn image_store(&self) -> ImageStore {
        ImageStore::new(self.settings.storage.images_path(&self.data_dir))
    }

    /// Persists `settings` and makes them current
    pub fn replace_settings(&mut self, settings: AppSettings) -> Result<()> {
        let saved = self
            .settings_manager
            .save(&settings)
            .context("saving settings")?;
        self.settings = saved;
        Ok(())
    }
}
