use rusqlite::Connection;

use crate::Db;
use crate::error::Result;

const MIGRATION_0001: &str = include_str!("../migrations/0001_init.sql");
const MIGRATION_0002: &str = include_str!("../migrations/0002_add_chat_summary.sql");
const MIGRATION_0003: &str = include_str!("../migrations/0003_add_app_setting.sql");

const MIGRATIONS: &[(&str, &str)] = &[
    ("0001_init", MIGRATION_0001),
    ("0002_add_chat_summary", MIGRATION_0002),
    ("0003_add_app_setting", MIGRATION_0003),
];

impl Db {
    /// Brings the schema up to date. Safe to run on every start.
    pub fn migrate(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (name, sql) in MIGRATIONS {
            if *name == "0002_add_chat_summary" {
                let has_chat = table_has_column(&tx, "events", "chat")?;
                let has_summary = table_has_column(&tx, "events", "summary")?;
                if !has_chat && !has_summary {
                    tx.execute_batch(sql)?;
                } else {
                    ensure_chat_summary_columns(&tx)?;
                }
                continue;
            }
            tx.execute_batch(sql)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn ensure_chat_summary_columns(conn: &Connection) -> Result<()> {
    if !table_has_column(conn, "events", "chat")? {
        conn.execute("ALTER TABLE events ADD COLUMN chat TEXT", [])?;
    }
    if !table_has_column(conn, "events", "summary")? {
        conn.execute("ALTER TABLE events ADD COLUMN summary TEXT", [])?;
    }
    Ok(())
}
