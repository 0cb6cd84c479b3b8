use monitor_core::{FilterOptions, HistoricalPage, HookEvent, NewHookEvent};
use rusqlite::params;

use crate::Db;
use crate::error::Result;
use crate::helpers::{EVENT_COLUMNS, millis_to_iso, row_to_event_row};

/// Upper bound on session ids returned by `filter_options`.
const FILTER_SESSION_LIMIT: i64 = 100;

impl Db {
    pub fn insert_event(&self, event: &NewHookEvent) -> Result<HookEvent> {
        let payload = serde_json::to_string(&event.payload)?;
        let chat = match &event.chat {
            Some(chat) => Some(serde_json::to_string(chat)?),
            None => None,
        };
        let summary = event.summary.as_deref().filter(|value| !value.is_empty());
        self.conn.execute(
            r#"
            INSERT INTO events (
              source_app, session_id, hook_event_type, payload, chat, summary, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                event.source_app,
                event.session_id,
                event.hook_event_type,
                payload,
                chat,
                summary,
                event.timestamp
            ],
        )?;
        Ok(HookEvent {
            id: Some(self.conn.last_insert_rowid()),
            source_app: event.source_app.clone(),
            session_id: event.session_id.clone(),
            hook_event_type: event.hook_event_type.clone(),
            payload: event.payload.clone(),
            chat: event.chat.clone(),
            summary: summary.map(str::to_string),
            timestamp: event.timestamp,
        })
    }

    /// Latest `limit` events, returned oldest first.
    pub fn recent_events(&self, limit: usize) -> Result<Vec<HookEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY timestamp DESC, id DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit as i64], row_to_event_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        events.reverse();
        Ok(events)
    }

    /// One page of events strictly older than `before_ms`, oldest first.
    pub fn historical_events(&self, before_ms: i64, limit: usize) -> Result<HistoricalPage> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE timestamp < ?1 ORDER BY timestamp DESC, id DESC LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![before_ms, limit as i64], row_to_event_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        events.reverse();

        let Some(earliest) = events.first().map(|event| event.timestamp) else {
            return Ok(HistoricalPage {
                events,
                has_more: false,
                earliest_timestamp: None,
            });
        };
        let older: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM events WHERE timestamp < ?1",
            params![earliest],
            |row| row.get(0),
        )?;
        Ok(HistoricalPage {
            events,
            has_more: older > 0,
            earliest_timestamp: millis_to_iso(earliest),
        })
    }

    pub fn filter_options(&self) -> Result<FilterOptions> {
        let source_apps = self.distinct_strings(
            "SELECT DISTINCT source_app FROM events ORDER BY source_app",
            None,
        )?;
        let session_ids = self.distinct_strings(
            "SELECT DISTINCT session_id FROM events ORDER BY session_id DESC LIMIT ?1",
            Some(FILTER_SESSION_LIMIT),
        )?;
        let hook_event_types = self.distinct_strings(
            "SELECT DISTINCT hook_event_type FROM events ORDER BY hook_event_type",
            None,
        )?;
        Ok(FilterOptions {
            source_apps,
            session_ids,
            hook_event_types,
        })
    }

    pub fn count_events(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn distinct_strings(&self, sql: &str, limit: Option<i64>) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = match limit {
            Some(limit) => stmt.query(params![limit])?,
            None => stmt.query([])?,
        };
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(row.get::<_, String>(0)?);
        }
        Ok(values)
    }
}
