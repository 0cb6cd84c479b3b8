mod events;
mod grouped;
mod preferences;
mod usage_reports;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::error::Result;
use monitor_db::Db;

pub use events::EventsService;
pub use grouped::{GroupedView, GroupingService};
pub use preferences::PreferencesService;
pub use usage_reports::UsageService;

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub events: EventsService,
    pub grouping: GroupingService,
    pub preferences: PreferencesService,
    pub usage: UsageService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            events: EventsService::new(shared.clone()),
            grouping: GroupingService::new(shared.clone()),
            preferences: PreferencesService::new(shared.clone()),
            usage: UsageService::new(shared),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}
