use std::path::PathBuf;

use monitor_app::AppState;

#[derive(Clone)]
pub struct AppContext {
    pub app_state: AppState,
    pub app_data_dir: PathBuf,
    /// Events sent to a stream subscriber on connect.
    pub stream_recent_limit: usize,
}

impl AppContext {
    pub fn new(app_state: AppState, app_data_dir: PathBuf) -> Self {
        Self {
            app_state,
            app_data_dir,
            stream_recent_limit: monitor_app::STREAM_RECENT_LIMIT,
        }
    }
}
