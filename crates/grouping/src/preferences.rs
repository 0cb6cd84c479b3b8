use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::GroupingPreferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingPreset {
    Aggressive,
    Normal,
    Minimal,
}

impl FromStr for GroupingPreset {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "aggressive" => Ok(Self::Aggressive),
            "normal" => Ok(Self::Normal),
            "minimal" => Ok(Self::Minimal),
            other => Err(format!("unknown grouping preset: {other}")),
        }
    }
}

impl GroupingPreferences {
    /// Applies a preset; the `group_by_*` flags are left as they are.
    pub fn apply_preset(&mut self, preset: GroupingPreset) {
        let (time_window, min_events_to_group, max_group_size) = match preset {
            GroupingPreset::Aggressive => (15_000, 2, 50),
            GroupingPreset::Normal => (10_000, 2, 20),
            GroupingPreset::Minimal => (5_000, 3, 10),
        };
        self.enabled = true;
        self.time_window = time_window;
        self.min_events_to_group = min_events_to_group;
        self.max_group_size = max_group_size;
    }

    pub fn with_preset(mut self, preset: GroupingPreset) -> Self {
        self.apply_preset(preset);
        self
    }
}

/// Stored JSON merged over the defaults; unreadable input yields defaults.
pub fn parse_stored_preferences(raw: Option<&str>) -> GroupingPreferences {
    let Some(raw) = raw else {
        return GroupingPreferences::default();
    };
    match serde_json::from_str::<GroupingPreferences>(raw) {
        Ok(prefs) => prefs,
        Err(err) => {
            warn!(error = %err, "stored grouping preferences are invalid; using defaults");
            GroupingPreferences::default()
        }
    }
}
