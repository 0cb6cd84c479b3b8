use chrono::{SecondsFormat, TimeZone, Utc};
use monitor_core::HookEvent;
use rusqlite::Row;
use serde_json::Value;

pub(crate) const EVENT_COLUMNS: &str =
    "id, source_app, session_id, hook_event_type, payload, chat, summary, timestamp";

/// Raw column values; JSON columns are decoded outside the rusqlite closure so
/// that decode failures surface as `DbError::Json`.
pub(crate) struct EventRow {
    id: i64,
    source_app: String,
    session_id: String,
    hook_event_type: String,
    payload: String,
    chat: Option<String>,
    summary: Option<String>,
    timestamp: i64,
}

pub(crate) fn row_to_event_row(row: &Row<'_>) -> std::result::Result<EventRow, rusqlite::Error> {
    Ok(EventRow {
        id: row.get(0)?,
        source_app: row.get(1)?,
        session_id: row.get(2)?,
        hook_event_type: row.get(3)?,
        payload: row.get(4)?,
        chat: row.get(5)?,
        summary: row.get(6)?,
        timestamp: row.get(7)?,
    })
}

impl EventRow {
    pub(crate) fn into_event(self) -> std::result::Result<HookEvent, serde_json::Error> {
        let payload: Value = serde_json::from_str(&self.payload)?;
        let chat = match self.chat.as_deref() {
            Some(raw) if !raw.is_empty() => Some(serde_json::from_str::<Vec<Value>>(raw)?),
            _ => None,
        };
        Ok(HookEvent {
            id: Some(self.id),
            source_app: self.source_app,
            session_id: self.session_id,
            hook_event_type: self.hook_event_type,
            payload,
            chat,
            summary: self.summary.filter(|summary| !summary.is_empty()),
            timestamp: self.timestamp,
        })
    }
}

pub(crate) fn millis_to_iso(timestamp_ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
