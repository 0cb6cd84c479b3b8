use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Milliseconds since the epoch for an RFC 3339 timestamp.
pub fn parse_iso_to_millis(value: &str) -> Result<i64> {
    let parsed = DateTime::parse_from_rfc3339(value.trim()).map_err(|_| {
        AppError::InvalidInput("Invalid timestamp format. Use ISO 8601 format.".to_string())
    })?;
    Ok(parsed.with_timezone(&Utc).timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_offsets_to_utc_millis() {
        assert_eq!(parse_iso_to_millis("1970-01-01T00:00:02Z").expect("ms"), 2_000);
        assert_eq!(
            parse_iso_to_millis("1970-01-01T01:00:00+01:00").expect("ms"),
            0
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse_iso_to_millis("yesterday"),
            Err(AppError::InvalidInput(_))
        ));
    }
}
