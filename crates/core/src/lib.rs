mod burn_rate;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use burn_rate::{
    ActivityLevel, BurnRate, ProjectedUsage, block_progress_percent, calculate_burn_rate,
    project_block_usage, total_tokens,
};

/// Length of a billing block.
pub const BLOCK_DURATION_HOURS: i64 = 5;

pub fn block_duration() -> Duration {
    Duration::hours(BLOCK_DURATION_HOURS)
}

/// A hook event as persisted and served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub source_app: String,
    pub session_id: String,
    pub hook_event_type: String,
    pub payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub timestamp: i64,
}

/// Event fields accepted from a producer before the store assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHookEvent {
    pub source_app: String,
    pub session_id: String,
    pub hook_event_type: String,
    pub payload: Value,
    pub chat: Option<Vec<Value>>,
    pub summary: Option<String>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub source_apps: Vec<String>,
    pub session_ids: Vec<String>,
    pub hook_event_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPage {
    pub events: Vec<HookEvent>,
    pub has_more: bool,
    pub earliest_timestamp: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCounts {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
}

impl TokenCounts {
    pub fn add(&mut self, other: &TokenCounts) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
        self.cache_creation_input_tokens = self
            .cache_creation_input_tokens
            .saturating_add(other.cache_creation_input_tokens);
        self.cache_read_input_tokens = self
            .cache_read_input_tokens
            .saturating_add(other.cache_read_input_tokens);
    }
}

/// One token-consuming request read from a usage transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub token_counts: TokenCounts,
    #[serde(rename = "costUSD")]
    pub cost_usd: f64,
}

/// A fixed-duration billing window over usage entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageBlock {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_end_time: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[serde(default)]
    pub is_gap: bool,
    pub entries: Vec<UsageEntry>,
    pub token_counts: TokenCounts,
    #[serde(rename = "costUSD")]
    pub cost_usd: f64,
    pub models: Vec<String>,
}

/// Case-insensitive glob match where `*` matches any run of characters.
pub fn model_matches_pattern(model: &str, pattern: &str) -> bool {
    let model = model.to_ascii_lowercase();
    let pattern = pattern.to_ascii_lowercase();
    if pattern == "*" {
        return true;
    }
    if !pattern.contains('*') {
        return model == pattern;
    }
    let mut remainder = model.as_str();
    let mut anchored = !pattern.starts_with('*');
    for part in pattern.split('*') {
        if part.is_empty() {
            continue;
        }
        match remainder.find(part) {
            Some(index) => {
                if anchored && index != 0 {
                    return false;
                }
                remainder = &remainder[index + part.len()..];
                anchored = false;
            }
            None => return false,
        }
    }
    pattern.ends_with('*') || remainder.is_empty()
}
