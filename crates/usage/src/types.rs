use std::path::PathBuf;
use std::str::FromStr;

use monitor_core::{ActivityLevel, BurnRate, ProjectedUsage, UsageBlock};
use serde::{Deserialize, Serialize};

/// Errors emitted while locating or reading usage transcripts.
#[derive(Debug, thiserror::Error)]
pub enum UsageError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no usage data directory found (checked {checked})")]
    NoDataDirectory { checked: String },
}

pub type Result<T> = std::result::Result<T, UsageError>;

/// Non-fatal issues encountered while scanning transcripts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadIssue {
    pub file_path: String,
    pub message: String,
}

/// Load summary returned alongside the entries.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStats {
    pub files_scanned: usize,
    pub lines_read: usize,
    pub entries_loaded: usize,
    pub duplicates_skipped: usize,
    pub issues: Vec<LoadIssue>,
}

/// How an entry's cost is determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostMode {
    /// Stored `costUSD` when present, otherwise the pricing table.
    #[default]
    Auto,
    Calculate,
    Display,
}

impl FromStr for CostMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "calculate" => Ok(Self::Calculate),
            "display" => Ok(Self::Display),
            other => Err(format!("unknown cost mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLimit {
    Tokens(u64),
    /// Largest raw total among non-gap blocks.
    Max,
}

impl FromStr for TokenLimit {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("max") {
            return Ok(Self::Max);
        }
        value
            .parse::<u64>()
            .map(Self::Tokens)
            .map_err(|_| format!("invalid token limit: {value}"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockQuery {
    pub active: bool,
    pub recent: bool,
    pub mode: CostMode,
    pub order: SortOrder,
    pub token_limit: Option<TokenLimit>,
}

/// A usage block with derived totals, burn rate and projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedBlock {
    #[serde(flatten)]
    pub block: UsageBlock,
    pub total_tokens: u64,
    pub entry_count: usize,
    pub burn_rate: Option<BurnRate>,
    pub projection: Option<ProjectedUsage>,
    /// Derived from the indicator rate; `None` without a burn rate.
    pub activity_level: Option<ActivityLevel>,
    pub progress_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveBlock {
    pub block: Option<EnrichedBlock>,
    pub message: Option<String>,
}
