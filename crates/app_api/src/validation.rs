use monitor_app::{AppError, Result};
use monitor_core::NewHookEvent;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::requests::PostEventRequest;

pub const HOOK_EVENT_TYPES: [&str; 7] = [
    "PreToolUse",
    "PostToolUse",
    "Stop",
    "UserPromptSubmit",
    "SubagentStop",
    "Notification",
    "PreCompact",
];

const MAX_SOURCE_APP_LEN: usize = 100;
const MAX_SESSION_ID_LEN: usize = 50;
const MAX_SUMMARY_LEN: usize = 1_000;
const MAX_CHAT_ITEMS: usize = 1_000;

static SOURCE_APP: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").ok());
static SESSION_ID: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]+$").ok());

fn invalid(message: &str) -> AppError {
    AppError::InvalidInput(message.to_string())
}

fn matches(regex: &Lazy<Option<Regex>>, value: &str) -> bool {
    regex.as_ref().is_some_and(|regex| regex.is_match(value))
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::InvalidInput(format!(
            "Missing required fields: {field}"
        ))),
    }
}

/// Checks a posted event and stamps it with `now_ms` when it carries no
/// timestamp of its own.
pub fn validate_event(req: PostEventRequest, now_ms: i64) -> Result<NewHookEvent> {
    let source_app = required(req.source_app, "source_app")?;
    let session_id = required(req.session_id, "session_id")?;
    let hook_event_type = required(req.hook_event_type, "hook_event_type")?;
    let payload = req
        .payload
        .ok_or_else(|| invalid("Missing required fields: payload"))?;

    if source_app.chars().count() > MAX_SOURCE_APP_LEN {
        return Err(invalid("Source app must be less than 100 characters"));
    }
    if !matches(&SOURCE_APP, &source_app) {
        return Err(invalid(
            "Source app must contain only letters, numbers, underscores, and hyphens",
        ));
    }
    if session_id.chars().count() > MAX_SESSION_ID_LEN {
        return Err(invalid("Session ID must be less than 50 characters"));
    }
    if !matches(&SESSION_ID, &session_id) {
        return Err(invalid("Session ID must be a valid format"));
    }
    if !HOOK_EVENT_TYPES.contains(&hook_event_type.as_str()) {
        return Err(AppError::InvalidInput(format!(
            "Unsupported hook event type: {hook_event_type}"
        )));
    }
    if !payload.is_object() {
        return Err(invalid("Payload must be a JSON object"));
    }
    if req
        .summary
        .as_ref()
        .is_some_and(|summary| summary.chars().count() > MAX_SUMMARY_LEN)
    {
        return Err(invalid("Summary must be less than 1000 characters"));
    }
    if req
        .chat
        .as_ref()
        .is_some_and(|chat| chat.len() > MAX_CHAT_ITEMS)
    {
        return Err(invalid("Chat must have at most 1000 items"));
    }
    let timestamp = match req.timestamp {
        Some(timestamp) if timestamp <= 0 => {
            return Err(invalid("Timestamp must be a positive integer"));
        }
        Some(timestamp) => timestamp,
        None => now_ms,
    };

    Ok(NewHookEvent {
        source_app,
        session_id,
        hook_event_type,
        payload,
        chat: req.chat,
        summary: req.summary,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request() -> PostEventRequest {
        PostEventRequest {
            source_app: Some("my-app_1".to_string()),
            session_id: Some("abc-123".to_string()),
            hook_event_type: Some("PreToolUse".to_string()),
            payload: Some(json!({"tool_name": "Bash"})),
            ..PostEventRequest::default()
        }
    }

    fn rejects(req: PostEventRequest) -> String {
        match validate_event(req, 1) {
            Err(AppError::InvalidInput(message)) => message,
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[test]
    fn defaults_timestamp_to_now() {
        let event = validate_event(request(), 42).expect("valid");
        assert_eq!(event.timestamp, 42);

        let stamped = PostEventRequest {
            timestamp: Some(7),
            ..request()
        };
        assert_eq!(validate_event(stamped, 42).expect("valid").timestamp, 7);
    }

    #[test]
    fn missing_fields_are_named() {
        let message = rejects(PostEventRequest {
            payload: None,
            ..request()
        });
        assert!(message.contains("payload"));
        let message = rejects(PostEventRequest {
            source_app: Some(String::new()),
            ..request()
        });
        assert!(message.contains("source_app"));
    }

    #[test]
    fn identifiers_are_checked() {
        rejects(PostEventRequest {
            source_app: Some("my app".to_string()),
            ..request()
        });
        rejects(PostEventRequest {
            session_id: Some("abc_123".to_string()),
            ..request()
        });
        rejects(PostEventRequest {
            session_id: Some("a".repeat(51)),
            ..request()
        });
        assert!(
            validate_event(
                PostEventRequest {
                    source_app: Some("a".repeat(100)),
                    ..request()
                },
                1
            )
            .is_ok()
        );
    }

    #[test]
    fn event_type_and_payload_shape() {
        rejects(PostEventRequest {
            hook_event_type: Some("Whatever".to_string()),
            ..request()
        });
        rejects(PostEventRequest {
            payload: Some(json!(["not", "an", "object"])),
            ..request()
        });
        for event_type in HOOK_EVENT_TYPES {
            let req = PostEventRequest {
                hook_event_type: Some(event_type.to_string()),
                ..request()
            };
            assert!(validate_event(req, 1).is_ok(), "{event_type}");
        }
    }

    #[test]
    fn size_limits_and_timestamp() {
        rejects(PostEventRequest {
            summary: Some("x".repeat(1_001)),
            ..request()
        });
        rejects(PostEventRequest {
            chat: Some(vec![json!({}); 1_001]),
            ..request()
        });
        rejects(PostEventRequest {
            timestamp: Some(0),
            ..request()
        });
    }

    #[test]
    fn unknown_body_fields_are_rejected() {
        let err = PostEventRequest::from_json(json!({"source_app": "a", "extra": 1}))
            .expect_err("unknown field");
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
