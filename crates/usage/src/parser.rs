use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use monitor_core::{TokenCounts, UsageEntry};
use serde::Deserialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptLine {
    timestamp: Option<String>,
    session_id: Option<String>,
    request_id: Option<String>,
    #[serde(rename = "costUSD")]
    cost_usd: Option<f64>,
    message: Option<TranscriptMessage>,
}

#[derive(Debug, Deserialize)]
struct TranscriptMessage {
    id: Option<String>,
    model: Option<String>,
    usage: Option<TranscriptUsage>,
}

#[derive(Debug, Deserialize)]
struct TranscriptUsage {
    input_tokens: u64,
    output_tokens: u64,
    cache_creation_input_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
}

/// An entry as read from disk, before a cost mode is applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedEntry {
    pub entry: UsageEntry,
    pub stored_cost: Option<f64>,
}

impl ParsedEntry {
    /// Hash of `message.id` and `requestId`; `None` when either is missing.
    pub(crate) fn dedupe_key(&self) -> Option<String> {
        let message_id = self.entry.message_id.as_deref()?;
        let request_id = self.entry.request_id.as_deref()?;
        let mut hasher = Sha256::new();
        hasher.update(message_id.as_bytes());
        hasher.update(b":");
        hasher.update(request_id.as_bytes());
        Some(hex_digest(&hasher.finalize()))
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut out, "{:02x}", byte);
    }
    out
}

/// Lines without a timestamp or `message.usage` carry no usage and yield
/// `None`, as do lines that are not JSON.
pub(crate) fn parse_line(line: &str) -> Option<ParsedEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let parsed: TranscriptLine = serde_json::from_str(line).ok()?;
    let timestamp = parse_timestamp(parsed.timestamp.as_deref()?)?;
    let message = parsed.message?;
    let usage = message.usage?;
    let model = message
        .model
        .filter(|model| !model.is_empty() && model != "<synthetic>");
    Some(ParsedEntry {
        entry: UsageEntry {
            timestamp,
            model,
            session_id: parsed.session_id,
            message_id: message.id,
            request_id: parsed.request_id,
            token_counts: TokenCounts {
                input_tokens: usage.input_tokens,
                output_tokens: usage.output_tokens,
                cache_creation_input_tokens: usage.cache_creation_input_tokens.unwrap_or(0),
                cache_read_input_tokens: usage.cache_read_input_tokens.unwrap_or(0),
            },
            cost_usd: 0.0,
        },
        stored_cost: parsed.cost_usd,
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASSISTANT_LINE: &str = r#"{"timestamp":"2025-06-01T10:15:00.000Z","sessionId":"abc","requestId":"req_1","type":"assistant","message":{"id":"msg_1","model":"claude-sonnet-4-20250514","usage":{"input_tokens":100,"output_tokens":50,"cache_creation_input_tokens":10,"cache_read_input_tokens":5}}}"#;

    #[test]
    fn parses_assistant_usage_line() {
        let parsed = parse_line(ASSISTANT_LINE).expect("entry");
        let entry = &parsed.entry;
        assert_eq!(entry.model.as_deref(), Some("claude-sonnet-4-20250514"));
        assert_eq!(entry.session_id.as_deref(), Some("abc"));
        assert_eq!(entry.message_id.as_deref(), Some("msg_1"));
        assert_eq!(entry.request_id.as_deref(), Some("req_1"));
        assert_eq!(entry.token_counts.input_tokens, 100);
        assert_eq!(entry.token_counts.cache_read_input_tokens, 5);
        assert_eq!(parsed.stored_cost, None);
        assert!(parsed.dedupe_key().is_some());
    }

    #[test]
    fn keeps_stored_cost() {
        let line = r#"{"timestamp":"2025-06-01T10:15:00Z","costUSD":0.25,"message":{"usage":{"input_tokens":1,"output_tokens":2}}}"#;
        let parsed = parse_line(line).expect("entry");
        assert_eq!(parsed.stored_cost, Some(0.25));
        assert_eq!(parsed.entry.token_counts.cache_creation_input_tokens, 0);
        assert_eq!(parsed.entry.model, None);
    }

    #[test]
    fn skips_lines_without_usage() {
        assert!(parse_line(r#"{"timestamp":"2025-06-01T10:15:00Z","type":"user","message":{"role":"user"}}"#).is_none());
        assert!(parse_line(r#"{"type":"summary","summary":"x"}"#).is_none());
        assert!(parse_line("not json").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn dedupe_key_requires_both_ids() {
        let line = r#"{"timestamp":"2025-06-01T10:15:00Z","message":{"id":"msg_1","usage":{"input_tokens":1,"output_tokens":2}}}"#;
        let parsed = parse_line(line).expect("entry");
        assert_eq!(parsed.dedupe_key(), None);
    }

    #[test]
    fn synthetic_model_is_dropped() {
        let line = r#"{"timestamp":"2025-06-01T10:15:00Z","message":{"model":"<synthetic>","usage":{"input_tokens":0,"output_tokens":0}}}"#;
        let parsed = parse_line(line).expect("entry");
        assert_eq!(parsed.entry.model, None);
    }
}
