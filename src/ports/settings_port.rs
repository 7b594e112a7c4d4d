//! Per-user chart settings persistence.

use crate::domain::error::StocktaError;
use crate::domain::settings::ChartSettings;

pub trait SettingsPort {
    /// Stored settings, or the defaults (persisted) for a user seen for the first time.
    fn load(&self, user_id: i64) -> Result<ChartSettings, StocktaError>;

    fn save(&self, user_id: i64, settings: &ChartSettings) -> Result<(), StocktaError>;

    /// Loads, applies `assignments` atomically and saves.
    fn update(
        &self,
        user_id: i64,
        assignments: &[(String, bool)],
    ) -> Result<ChartSettings, StocktaError> {
        let mut settings = self.load(user_id)?;
        settings.apply_all(assignments)?;
        self.save(user_id, &settings)?;
        Ok(settings)
    }
}
