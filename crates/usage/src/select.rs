use chrono::{DateTime, Duration, Utc};
use monitor_core::{
    ActivityLevel, UsageBlock, block_progress_percent, calculate_burn_rate, project_block_usage,
    total_tokens,
};
use tracing::warn;

use crate::types::{BlockQuery, EnrichedBlock, LiveBlock, SortOrder, TokenLimit};

const RECENT_DAYS: i64 = 3;
pub(crate) const NO_ACTIVE_BLOCK: &str = "No active session block";

/// Adds totals to a block; burn rate and projection only for active blocks.
pub fn enrich_block(block: UsageBlock, now: DateTime<Utc>) -> EnrichedBlock {
    let (burn_rate, projection) = if block.is_active {
        (
            calculate_burn_rate(&block),
            project_block_usage(&block, now),
        )
    } else {
        (None, None)
    };
    EnrichedBlock {
        total_tokens: total_tokens(&block.token_counts),
        entry_count: block.entries.len(),
        activity_level: burn_rate
            .map(|rate| ActivityLevel::from_rate(rate.tokens_per_minute_for_indicator)),
        progress_percent: block_progress_percent(&block, now),
        burn_rate,
        projection,
        block,
    }
}

pub fn select_blocks(
    blocks: Vec<UsageBlock>,
    query: &BlockQuery,
    now: DateTime<Utc>,
) -> Vec<EnrichedBlock> {
    let ceiling = query.token_limit.map(|limit| match limit {
        TokenLimit::Tokens(tokens) => tokens,
        TokenLimit::Max => blocks
            .iter()
            .filter(|block| !block.is_gap)
            .map(|block| total_tokens(&block.token_counts))
            .max()
            .unwrap_or(0),
    });
    let recent_cutoff = now - Duration::days(RECENT_DAYS);

    let mut selected: Vec<UsageBlock> = blocks
        .into_iter()
        .filter(|block| !query.active || block.is_active)
        .filter(|block| !query.recent || block.is_active || block.start_time >= recent_cutoff)
        .filter(|block| match ceiling {
            Some(ceiling) => total_tokens(&block.token_counts) <= ceiling,
            None => true,
        })
        .collect();

    selected.sort_by(|left, right| left.start_time.cmp(&right.start_time));
    if query.order == SortOrder::Desc {
        selected.reverse();
    }
    selected
        .into_iter()
        .map(|block| enrich_block(block, now))
        .collect()
}

/// The single active block, if any. Several active blocks are an upstream
/// inconsistency; the newest one wins.
pub fn live_block(blocks: Vec<UsageBlock>, now: DateTime<Utc>) -> LiveBlock {
    let mut active: Vec<UsageBlock> = blocks
        .into_iter()
        .filter(|block| block.is_active)
        .collect();
    active.sort_by(|left, right| right.start_time.cmp(&left.start_time));
    let extra = active.len().saturating_sub(1);
    let Some(newest) = active.into_iter().next() else {
        return LiveBlock {
            block: None,
            message: Some(NO_ACTIVE_BLOCK.to_string()),
        };
    };
    if extra > 0 {
        warn!(
            extra,
            block_id = %newest.id,
            "more than one active usage block; using the newest"
        );
    }
    LiveBlock {
        block: Some(enrich_block(newest, now)),
        message: None,
    }
}
