use grouping::{GroupingPreferences, GroupingPreset, parse_stored_preferences};
use monitor_db::Db;

use crate::error::{AppError, Result};
use crate::services::{SharedConfig, open_db};

#[derive(Clone)]
pub struct PreferencesService {
    config: SharedConfig,
}

impl PreferencesService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Stored preferences, or the defaults when nothing usable is stored.
    pub fn get(&self) -> Result<GroupingPreferences> {
        let raw = self.db()?.get_grouping_preferences_json()?;
        Ok(parse_stored_preferences(raw.as_deref()))
    }

    pub fn set(&self, prefs: GroupingPreferences) -> Result<GroupingPreferences> {
        validate(&prefs)?;
        let json = serde_json::to_string(&prefs)?;
        self.db()?.set_grouping_preferences_json(&json)?;
        Ok(prefs)
    }

    pub fn apply_preset(&self, preset: GroupingPreset) -> Result<GroupingPreferences> {
        let prefs = self.get()?.with_preset(preset);
        self.set(prefs)
    }
}

fn validate(prefs: &GroupingPreferences) -> Result<()> {
    if prefs.time_window < 0 {
        return Err(AppError::InvalidInput(
            "timeWindow must not be negative".to_string(),
        ));
    }
    if prefs.min_events_to_group == 0 {
        return Err(AppError::InvalidInput(
            "minEventsToGroup must be at least 1".to_string(),
        ));
    }
    if prefs.max_group_size == 0 {
        return Err(AppError::InvalidInput(
            "maxGroupSize must be at least 1".to_string(),
        ));
    }
    Ok(())
}
