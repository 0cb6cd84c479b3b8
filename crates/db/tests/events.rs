mod support;

use serde_json::json;
use support::{insert_events, make_event, setup_db};

#[test]
fn insert_assigns_id_and_round_trips_optional_fields() {
    let test_db = setup_db();
    let db = &test_db.db;
    let mut event = make_event("s-1", "PreToolUse", 1_700_000_000_000);
    event.chat = Some(vec![json!({ "role": "user", "content": "hi" })]);
    event.summary = Some("Ran ls".to_string());

    let stored = db.insert_event(&event).expect("insert");
    assert!(stored.id.is_some());

    let recent = db.recent_events(10).expect("recent");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, stored.id);
    assert_eq!(recent[0].payload["tool_input"]["command"], "ls");
    assert_eq!(recent[0].chat.as_ref().map(Vec::len), Some(1));
    assert_eq!(recent[0].summary.as_deref(), Some("Ran ls"));
}

#[test]
fn empty_summary_is_stored_as_absent() {
    let test_db = setup_db();
    let db = &test_db.db;
    let mut event = make_event("s-1", "Stop", 1_000);
    event.summary = Some(String::new());
    let stored = db.insert_event(&event).expect("insert");
    assert_eq!(stored.summary, None);
    let recent = db.recent_events(1).expect("recent");
    assert_eq!(recent[0].summary, None);
    assert_eq!(recent[0].chat, None);
}

#[test]
fn recent_events_returns_latest_in_ascending_order() {
    let test_db = setup_db();
    let db = &test_db.db;
    insert_events(
        db,
        &[
            make_event("s-1", "PreToolUse", 3_000),
            make_event("s-1", "PreToolUse", 1_000),
            make_event("s-1", "PreToolUse", 4_000),
            make_event("s-1", "PreToolUse", 2_000),
        ],
    );

    let recent = db.recent_events(3).expect("recent");
    let timestamps: Vec<i64> = recent.iter().map(|event| event.timestamp).collect();
    assert_eq!(timestamps, vec![2_000, 3_000, 4_000]);
}

#[test]
fn historical_page_reports_has_more() {
    let test_db = setup_db();
    let db = &test_db.db;
    insert_events(
        db,
        &[
            make_event("s-1", "Stop", 1_000),
            make_event("s-1", "Stop", 2_000),
            make_event("s-1", "Stop", 3_000),
            make_event("s-1", "Stop", 4_000),
        ],
    );

    let page = db.historical_events(4_000, 2).expect("page");
    let timestamps: Vec<i64> = page.events.iter().map(|event| event.timestamp).collect();
    assert_eq!(timestamps, vec![2_000, 3_000]);
    assert!(page.has_more);
    assert_eq!(
        page.earliest_timestamp.as_deref(),
        Some("1970-01-01T00:00:02.000Z")
    );

    let last = db.historical_events(2_000, 5).expect("last page");
    assert_eq!(last.events.len(), 1);
    assert!(!last.has_more);

    let empty = db.historical_events(1_000, 5).expect("empty page");
    assert!(empty.events.is_empty());
    assert!(!empty.has_more);
    assert_eq!(empty.earliest_timestamp, None);
}

#[test]
fn filter_options_are_distinct_and_sorted() {
    let test_db = setup_db();
    let db = &test_db.db;
    let mut other = make_event("s-2", "Stop", 5_000);
    other.source_app = "another-app".to_string();
    insert_events(
        db,
        &[
            make_event("s-1", "PreToolUse", 1_000),
            make_event("s-1", "PostToolUse", 2_000),
            make_event("s-3", "PreToolUse", 3_000),
            other,
        ],
    );

    let options = db.filter_options().expect("options");
    assert_eq!(options.source_apps, vec!["another-app", "demo-app"]);
    assert_eq!(options.session_ids, vec!["s-3", "s-2", "s-1"]);
    assert_eq!(
        options.hook_event_types,
        vec!["PostToolUse", "PreToolUse", "Stop"]
    );
    assert_eq!(db.count_events().expect("count"), 4);
}
