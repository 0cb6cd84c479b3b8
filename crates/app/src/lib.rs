pub mod app;
pub mod config;
pub mod error;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use config::{DEFAULT_HISTORICAL_LIMIT, DEFAULT_RECENT_LIMIT, STREAM_RECENT_LIMIT};
pub use error::{ApiError, AppError, Result};
pub use services::{
    AppServices, EventsService, GroupedView, GroupingService, PreferencesService, UsageService,
};
pub use startup::{AppPaths, ensure_app_data_dir};
pub use util::time::{now_millis, parse_iso_to_millis};
