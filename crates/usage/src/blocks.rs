use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use monitor_core::{TokenCounts, UsageBlock, UsageEntry, block_duration};

fn floor_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_minute(0)
        .and_then(|ts| ts.with_second(0))
        .and_then(|ts| ts.with_nanosecond(0))
        .unwrap_or(ts)
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Partitions timestamp-sorted entries into 5-hour billing blocks.
///
/// A block starts at the hour floor of its first entry. An entry more than
/// five hours after the block start, or after the previous entry, opens a new
/// block; idle stretches longer than five hours are emitted as gap blocks.
pub fn identify_blocks(entries: &[UsageEntry], now: DateTime<Utc>) -> Vec<UsageBlock> {
    let duration = block_duration();
    let mut blocks = Vec::new();
    let mut current: Vec<UsageEntry> = Vec::new();
    let mut block_start: Option<DateTime<Utc>> = None;

    for entry in entries {
        let Some(start) = block_start else {
            block_start = Some(floor_to_hour(entry.timestamp));
            current.push(entry.clone());
            continue;
        };
        let since_start = entry.timestamp - start;
        let last_timestamp = current
            .last()
            .map(|last| last.timestamp)
            .unwrap_or(start);
        let since_last = entry.timestamp - last_timestamp;
        if since_start > duration || since_last > duration {
            blocks.push(build_block(start, std::mem::take(&mut current), now));
            if let Some(gap) = gap_block(last_timestamp, entry.timestamp) {
                blocks.push(gap);
            }
            block_start = Some(floor_to_hour(entry.timestamp));
        }
        current.push(entry.clone());
    }
    if let Some(start) = block_start
        && !current.is_empty()
    {
        blocks.push(build_block(start, current, now));
    }
    blocks
}

fn build_block(start: DateTime<Utc>, entries: Vec<UsageEntry>, now: DateTime<Utc>) -> UsageBlock {
    let end = start + block_duration();
    let actual_end = entries.last().map(|entry| entry.timestamp);
    let is_active = actual_end
        .map(|last| now - last < block_duration() && now < end)
        .unwrap_or(false);

    let mut token_counts = TokenCounts::default();
    let mut cost_usd = 0.0;
    let mut models: Vec<String> = Vec::new();
    for entry in &entries {
        token_counts.add(&entry.token_counts);
        cost_usd += entry.cost_usd;
        if let Some(model) = entry.model.as_ref()
            && !models.contains(model)
        {
            models.push(model.clone());
        }
    }

    UsageBlock {
        id: iso(start),
        start_time: start,
        end_time: end,
        actual_end_time: actual_end,
        is_active,
        is_gap: false,
        entries,
        token_counts,
        cost_usd,
        models,
    }
}

fn gap_block(last_activity: DateTime<Utc>, next_activity: DateTime<Utc>) -> Option<UsageBlock> {
    if next_activity - last_activity <= block_duration() {
        return None;
    }
    let start = last_activity + block_duration();
    Some(UsageBlock {
        id: format!("gap-{}", iso(start)),
        start_time: start,
        end_time: next_activity,
        actual_end_time: None,
        is_active: false,
        is_gap: true,
        entries: Vec::new(),
        token_counts: TokenCounts::default(),
        cost_usd: 0.0,
        models: Vec::new(),
    })
}
