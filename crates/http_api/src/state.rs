use std::time::Duration;

use app_api::AppContext;

use crate::broadcast::Broadcaster;

pub const DEFAULT_TOKEN_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct HttpState {
    pub context: AppContext,
    pub broadcaster: Broadcaster,
}

impl HttpState {
    pub fn new(context: AppContext, token_interval: Duration) -> Self {
        let broadcaster = Broadcaster::new(context.clone(), token_interval);
        Self {
            context,
            broadcaster,
        }
    }
}
