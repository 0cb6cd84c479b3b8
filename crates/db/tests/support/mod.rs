#![allow(dead_code)]

use std::path::PathBuf;

use monitor_core::NewHookEvent;
use monitor_db::Db;
use serde_json::json;
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("events.db");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn make_event(session_id: &str, hook_event_type: &str, timestamp: i64) -> NewHookEvent {
    NewHookEvent {
        source_app: "demo-app".to_string(),
        session_id: session_id.to_string(),
        hook_event_type: hook_event_type.to_string(),
        payload: json!({ "tool_name": "Bash", "tool_input": { "command": "ls" } }),
        chat: None,
        summary: None,
        timestamp,
    }
}

pub fn insert_events(db: &Db, events: &[NewHookEvent]) {
    for event in events {
        db.insert_event(event).expect("insert event");
    }
}
