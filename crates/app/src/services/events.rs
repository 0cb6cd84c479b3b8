use monitor_core::{FilterOptions, HistoricalPage, HookEvent, NewHookEvent};
use monitor_db::Db;

use crate::error::Result;
use crate::services::{SharedConfig, open_db};

#[derive(Clone)]
pub struct EventsService {
    config: SharedConfig,
}

impl EventsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn insert(&self, event: &NewHookEvent) -> Result<HookEvent> {
        let stored = self.db()?.insert_event(event)?;
        tracing::debug!(
            id = stored.id,
            source_app = %stored.source_app,
            event_type = %stored.hook_event_type,
            "stored hook event"
        );
        Ok(stored)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<HookEvent>> {
        Ok(self.db()?.recent_events(limit)?)
    }

    pub fn historical(&self, before_ms: i64, limit: usize) -> Result<HistoricalPage> {
        Ok(self.db()?.historical_events(before_ms, limit)?)
    }

    pub fn filter_options(&self) -> Result<FilterOptions> {
        Ok(self.db()?.filter_options()?)
    }
}
