use std::fs;

use chrono::{TimeZone, Utc};
use tempfile::tempdir;
use usage::{
    BlockQuery, CostMode, UsageError, live_block, load_blocks, load_usage_entries, select_blocks,
};

fn line(ts: &str, message_id: &str, request_id: &str, input: u64) -> String {
    format!(
        r#"{{"timestamp":"{ts}","sessionId":"s-1","requestId":"{request_id}","type":"assistant","message":{{"id":"{message_id}","model":"claude-sonnet-4-20250514","usage":{{"input_tokens":{input},"output_tokens":0}}}}}}"#
    )
}

#[test]
fn loader_dedupes_and_builds_blocks_with_gaps() {
    let dir = tempdir().expect("temp dir");
    let project = dir.path().join("projects/-home-user-demo");
    fs::create_dir_all(&project).expect("create project dir");
    let first = [
        line("2025-06-01T10:10:00Z", "msg_1", "req_1", 100),
        line("2025-06-01T11:00:00Z", "msg_2", "req_2", 200),
        r#"{"type":"summary","summary":"not usage"}"#.to_string(),
    ]
    .join("\n");
    fs::write(project.join("a.jsonl"), first).expect("write a");
    let second = [
        line("2025-06-01T11:00:00Z", "msg_2", "req_2", 200),
        line("2025-06-01T20:00:00Z", "msg_3", "req_3", 300),
    ]
    .join("\n");
    fs::write(project.join("b.jsonl"), second).expect("write b");
    fs::write(project.join("notes.txt"), "ignored").expect("write notes");

    let roots = vec![dir.path().to_path_buf()];
    let loaded = load_usage_entries(&roots, CostMode::Calculate).expect("load");
    assert_eq!(loaded.stats.files_scanned, 2);
    assert_eq!(loaded.stats.duplicates_skipped, 1);
    assert_eq!(loaded.entries.len(), 3);
    assert!(loaded.entries[0].cost_usd > 0.0);

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 21, 0, 0).unwrap();
    let blocks = load_blocks(&roots, CostMode::Calculate, now).expect("blocks");
    assert_eq!(blocks.len(), 3);
    assert!(!blocks[0].is_gap);
    assert_eq!(blocks[0].token_counts.input_tokens, 300);
    assert!(blocks[1].is_gap);
    assert!(blocks[2].is_active);

    let enriched = select_blocks(blocks.clone(), &BlockQuery::default(), now);
    assert_eq!(enriched[0].block.id, "2025-06-01T20:00:00.000Z");

    let live = live_block(blocks, now);
    assert_eq!(live.block.expect("live").total_tokens, 300);
}

#[test]
fn missing_projects_dir_is_an_io_error() {
    let dir = tempdir().expect("temp dir");
    let roots = vec![dir.path().join("nowhere")];
    let err = load_usage_entries(&roots, CostMode::Auto).expect_err("missing dir");
    assert!(matches!(err, UsageError::Io { .. }));
}

#[test]
fn no_roots_is_reported() {
    let err = load_usage_entries(&[], CostMode::Auto).expect_err("no roots");
    assert!(matches!(err, UsageError::NoDataDirectory { .. }));
}
