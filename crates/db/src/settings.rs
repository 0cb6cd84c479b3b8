use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::Result;

pub const GROUPING_PREFERENCES_KEY: &str = "grouping_preferences";

impl Db {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM app_setting WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO app_setting (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_grouping_preferences_json(&self) -> Result<Option<String>> {
        self.get_setting(GROUPING_PREFERENCES_KEY)
    }

    pub fn set_grouping_preferences_json(&self, json: &str) -> Result<()> {
        self.set_setting(GROUPING_PREFERENCES_KEY, json)
    }
}
