mod error;
mod events;
mod helpers;
mod migrations;
mod settings;

use std::path::Path;

use rusqlite::Connection;

pub use error::{DbError, Result};
pub use settings::GROUPING_PREFERENCES_KEY;

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "cache_size", -20_000)?;
        Ok(Self { conn })
    }
}
