//! Per-user settings as pretty-printed JSON files, `user_<id>.json`.

use crate::domain::error::{SettingsError, StocktaError};
use crate::domain::settings::{ChartSettings, SettingsDocument};
use crate::ports::settings_port::SettingsPort;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub struct JsonSettingsAdapter {
    dir: PathBuf,
}

impl JsonSettingsAdapter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn user_path(&self, user_id: i64) -> PathBuf {
        self.dir.join(format!("user_{}.json", user_id))
    }

    fn store_error(&self, user_id: i64, e: impl std::fmt::Display) -> StocktaError {
        SettingsError::Store {
            reason: format!("{}: {}", self.user_path(user_id).display(), e),
        }
        .into()
    }
}

impl SettingsPort for JsonSettingsAdapter {
    /// An unreadable file falls back to the defaults without overwriting it.
    fn load(&self, user_id: i64) -> Result<ChartSettings, StocktaError> {
        let path = self.user_path(user_id);
        if !path.exists() {
            let defaults = ChartSettings::default();
            self.save(user_id, &defaults)?;
            return Ok(defaults);
        }

        let content = fs::read_to_string(&path).map_err(|e| self.store_error(user_id, e))?;
        match serde_json::from_str::<SettingsDocument>(&content) {
            Ok(doc) => Ok(doc.plot),
            Err(e) => {
                warn!(user_id, path = %path.display(), error = %e, "unreadable settings, using defaults");
                Ok(ChartSettings::default())
            }
        }
    }

    fn save(&self, user_id: i64, settings: &ChartSettings) -> Result<(), StocktaError> {
        fs::create_dir_all(&self.dir).map_err(|e| self.store_error(user_id, e))?;
        let doc = SettingsDocument { plot: *settings };
        let json = serde_json::to_string_pretty(&doc)?;
        fs::write(self.user_path(user_id), json).map_err(|e| self.store_error(user_id, e))
    }
}
