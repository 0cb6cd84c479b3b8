use monitor_app::{AppError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /api/events`. Every field is optional here so that missing
/// fields surface as validation errors rather than decode failures.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct PostEventRequest {
    pub source_app: Option<String>,
    pub session_id: Option<String>,
    pub hook_event_type: Option<String>,
    pub payload: Option<Value>,
    pub chat: Option<Vec<Value>>,
    pub summary: Option<String>,
    pub timestamp: Option<i64>,
}

impl PostEventRequest {
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|err| AppError::InvalidInput(format!("invalid event body: {err}")))
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RecentRequest {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct HistoricalRequest {
    pub before: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct GroupedRequest {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PresetRequest {
    pub preset: String,
}

/// Query of `GET /api/usage/blocks`; flags are on only for the literal `true`.
#[derive(Debug, Deserialize, Default)]
pub struct BlocksRequest {
    pub active: Option<String>,
    pub recent: Option<String>,
    pub mode: Option<String>,
    pub order: Option<String>,
    #[serde(rename = "tokenLimit")]
    pub token_limit: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DailyRequest {
    pub since: Option<String>,
    pub until: Option<String>,
    pub mode: Option<String>,
    pub order: Option<String>,
}
