use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TokenCounts, UsageBlock, block_duration};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnRate {
    pub tokens_per_minute: f64,
    /// Input and output tokens only, so cache-heavy work does not inflate the
    /// activity indicator.
    pub tokens_per_minute_for_indicator: f64,
    pub cost_per_hour: f64,
}

/// Linear extrapolation of the observed burn rate to the end of the block.
///
/// This is a forecast, not a guarantee: any change in rate after `now` is
/// ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedUsage {
    pub total_tokens: u64,
    pub total_cost: f64,
    pub remaining_minutes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    Idle,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl ActivityLevel {
    pub fn from_rate(tokens_per_minute: f64) -> Self {
        if tokens_per_minute <= 0.0 {
            Self::Idle
        } else if tokens_per_minute < 1_000.0 {
            Self::Low
        } else if tokens_per_minute < 10_000.0 {
            Self::Medium
        } else if tokens_per_minute < 50_000.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }
}

pub fn total_tokens(counts: &TokenCounts) -> u64 {
    counts
        .input_tokens
        .saturating_add(counts.output_tokens)
        .saturating_add(counts.cache_creation_input_tokens)
        .saturating_add(counts.cache_read_input_tokens)
}

/// Rate of consumption between the first and last entry of the block.
///
/// Entries are taken in the order supplied. Returns `None` for gap blocks,
/// empty blocks and blocks whose entries all share one instant.
pub fn calculate_burn_rate(block: &UsageBlock) -> Option<BurnRate> {
    if block.entries.is_empty() || block.is_gap {
        return None;
    }
    let first = block.entries.first()?;
    let last = block.entries.last()?;
    let duration_minutes =
        (last.timestamp - first.timestamp).num_milliseconds() as f64 / 60_000.0;
    if duration_minutes <= 0.0 {
        return None;
    }

    let total = total_tokens(&block.token_counts) as f64;
    let non_cache = block
        .token_counts
        .input_tokens
        .saturating_add(block.token_counts.output_tokens) as f64;
    Some(BurnRate {
        tokens_per_minute: total / duration_minutes,
        tokens_per_minute_for_indicator: non_cache / duration_minutes,
        cost_per_hour: (block.cost_usd / duration_minutes) * 60.0,
    })
}

pub fn project_block_usage(block: &UsageBlock, now: DateTime<Utc>) -> Option<ProjectedUsage> {
    if !block.is_active || block.is_gap {
        return None;
    }
    let burn_rate = calculate_burn_rate(block)?;

    let remaining_ms = (block.end_time - now).num_milliseconds() as f64;
    let remaining_minutes = (remaining_ms / 60_000.0).max(0.0);

    let current_tokens = total_tokens(&block.token_counts) as f64;
    let projected_tokens = current_tokens + burn_rate.tokens_per_minute * remaining_minutes;
    let projected_cost = block.cost_usd + (burn_rate.cost_per_hour / 60.0) * remaining_minutes;

    Some(ProjectedUsage {
        total_tokens: projected_tokens.round() as u64,
        total_cost: (projected_cost * 100.0).round() / 100.0,
        remaining_minutes: remaining_minutes.round() as u64,
    })
}

/// Share of the billing window already elapsed, 0 for inactive blocks.
pub fn block_progress_percent(block: &UsageBlock, now: DateTime<Utc>) -> u8 {
    if !block.is_active {
        return 0;
    }
    let elapsed = (now - block.start_time).num_milliseconds();
    if elapsed <= 0 {
        return 0;
    }
    let window = block_duration().num_milliseconds() as f64;
    ((elapsed as f64 / window) * 100.0).round().min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::UsageEntry;

    fn entry(ts: DateTime<Utc>) -> UsageEntry {
        UsageEntry {
            timestamp: ts,
            model: Some("claude-sonnet-4".to_string()),
            session_id: None,
            message_id: None,
            request_id: None,
            token_counts: TokenCounts::default(),
            cost_usd: 0.0,
        }
    }

    fn block(start: DateTime<Utc>, entry_offsets_min: &[i64]) -> UsageBlock {
        UsageBlock {
            id: start.to_rfc3339(),
            start_time: start,
            end_time: start + block_duration(),
            actual_end_time: None,
            is_active: true,
            is_gap: false,
            entries: entry_offsets_min
                .iter()
                .map(|offset| entry(start + Duration::minutes(*offset)))
                .collect(),
            token_counts: TokenCounts {
                input_tokens: 1_000,
                output_tokens: 500,
                cache_creation_input_tokens: 2_000,
                cache_read_input_tokens: 6_500,
            },
            cost_usd: 1.5,
            models: vec!["claude-sonnet-4".to_string()],
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn total_tokens_sums_every_kind() {
        let block = block(start(), &[0]);
        assert_eq!(total_tokens(&block.token_counts), 10_000);
    }

    #[test]
    fn burn_rate_over_elapsed_minutes() {
        let block = block(start(), &[0, 10]);
        let rate = calculate_burn_rate(&block).expect("rate");
        assert!((rate.tokens_per_minute - 1_000.0).abs() < 1e-9);
        assert!((rate.tokens_per_minute_for_indicator - 150.0).abs() < 1e-9);
        assert!((rate.cost_per_hour - 9.0).abs() < 1e-9);
    }

    #[test]
    fn burn_rate_none_for_single_instant() {
        let single = block(start(), &[0]);
        assert!(calculate_burn_rate(&single).is_none());
        let same_instant = block(start(), &[5, 5, 5]);
        assert!(calculate_burn_rate(&same_instant).is_none());
    }

    #[test]
    fn burn_rate_none_for_gap_or_empty_block() {
        let mut gap = block(start(), &[0, 30]);
        gap.is_gap = true;
        assert!(calculate_burn_rate(&gap).is_none());

        let empty = block(start(), &[]);
        assert!(calculate_burn_rate(&empty).is_none());
    }

    #[test]
    fn burn_rate_uses_supplied_order() {
        // Reversed entries give a negative span and therefore no rate.
        let block = block(start(), &[10, 0]);
        assert!(calculate_burn_rate(&block).is_none());
    }

    #[test]
    fn projection_extrapolates_to_block_end() {
        let block = block(start(), &[0, 10]);
        let now = start() + Duration::minutes(60);
        let projection = project_block_usage(&block, now).expect("projection");
        assert_eq!(projection.remaining_minutes, 240);
        assert_eq!(projection.total_tokens, 10_000 + 240_000);
        assert!((projection.total_cost - (1.5 + 0.15 * 240.0)).abs() < 1e-9);
    }

    #[test]
    fn projection_clamps_after_block_end() {
        let block = block(start(), &[0, 10]);
        let now = block.end_time + Duration::minutes(30);
        let projection = project_block_usage(&block, now).expect("projection");
        assert_eq!(projection.remaining_minutes, 0);
        assert_eq!(projection.total_tokens, 10_000);
        assert!((projection.total_cost - 1.5).abs() < 1e-9);
    }

    #[test]
    fn projection_none_for_inactive_block() {
        let mut block = block(start(), &[0, 10]);
        block.is_active = false;
        assert!(project_block_usage(&block, start()).is_none());
    }

    #[test]
    fn projection_rounds_cost_to_cents() {
        let mut block = block(start(), &[0, 7]);
        block.cost_usd = 0.333;
        let now = start() + Duration::minutes(299);
        let projection = project_block_usage(&block, now).expect("projection");
        let cents = projection.total_cost * 100.0;
        assert!((cents - cents.round()).abs() < 1e-6);
    }

    #[test]
    fn activity_level_thresholds() {
        assert_eq!(ActivityLevel::from_rate(0.0), ActivityLevel::Idle);
        assert_eq!(ActivityLevel::from_rate(999.0), ActivityLevel::Low);
        assert_eq!(ActivityLevel::from_rate(1_000.0), ActivityLevel::Medium);
        assert_eq!(ActivityLevel::from_rate(49_999.0), ActivityLevel::High);
        assert_eq!(ActivityLevel::from_rate(50_000.0), ActivityLevel::VeryHigh);
    }

    #[test]
    fn progress_is_clamped() {
        let block = block(start(), &[0]);
        assert_eq!(block_progress_percent(&block, start()), 0);
        assert_eq!(
            block_progress_percent(&block, start() + Duration::minutes(150)),
            50
        );
        assert_eq!(
            block_progress_percent(&block, start() + Duration::hours(9)),
            100
        );
    }
}
