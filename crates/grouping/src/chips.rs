use monitor_core::HookEvent;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::types::EventGroup;

const CHIP_MAX_CHARS: usize = 40;

static READ_SUMMARY: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)^read\s+(.+)$").ok());
static WRITE_SUMMARY: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)^write\s+(?:to\s+)?(.+)$").ok());

/// The payload fields chips and group keys are derived from.
///
/// Fields with an unexpected shape read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolPayload {
    #[serde(default, deserialize_with = "lenient_string")]
    pub tool_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_input")]
    pub tool_input: Option<ToolInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ToolInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub command: Option<String>,
}

// Non-string values and empty strings both read as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) if !text.is_empty() => Some(text),
        _ => None,
    })
}

// A `tool_input` that is not an object is ignored without losing `tool_name`.
fn lenient_input<'de, D>(deserializer: D) -> Result<Option<ToolInput>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(ToolInput::deserialize(value).ok())
}

impl ToolPayload {
    pub fn from_event(event: &HookEvent) -> Self {
        if !event.payload.is_object() {
            return Self::default();
        }
        Self::deserialize(&event.payload).unwrap_or_default()
    }

    fn file_path(&self) -> Option<&str> {
        self.tool_input.as_ref()?.file_path.as_deref()
    }

    fn command(&self) -> Option<&str> {
        self.tool_input.as_ref()?.command.as_deref()
    }
}

fn truncate(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(CHIP_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn summary_capture(regex: &Lazy<Option<Regex>>, summary: &str) -> Option<String> {
    let captures = regex.as_ref()?.captures(summary)?;
    Some(captures.get(1)?.as_str().trim().to_string())
}

/// Short display label for an event, if one can be derived.
pub fn extract_chip(event: &HookEvent) -> Option<String> {
    let payload = ToolPayload::from_event(event);
    if let Some(path) = payload.file_path() {
        let name = path.rsplit('/').next().filter(|name| !name.is_empty());
        return Some(name.unwrap_or(path).to_string());
    }
    if let Some(command) = payload.command() {
        return Some(truncate(command));
    }
    let summary = event.summary.as_deref().filter(|summary| !summary.is_empty())?;
    summary_capture(&READ_SUMMARY, summary)
        .or_else(|| summary_capture(&WRITE_SUMMARY, summary))
        .or_else(|| Some(truncate(summary)))
}

pub fn group_summary(group: &EventGroup) -> String {
    let Some(tool) = group.criteria.tool_name.as_deref() else {
        return format!("{} operations", group.criteria.event_type);
    };
    match tool.to_ascii_lowercase().as_str() {
        "read" => {
            let files = group
                .events
                .iter()
                .filter(|event| extract_chip(event).is_some_and(|chip| chip.contains('.')))
                .count();
            match files {
                0 => format!("{tool} operations"),
                1 => "Read 1 file".to_string(),
                n => format!("Read {n} files"),
            }
        }
        "write" => "Write operations".to_string(),
        "edit" | "multiedit" => "Edit operations".to_string(),
        "bash" => "Command executions".to_string(),
        "task" => "Agent tasks".to_string(),
        _ => format!("{tool} operations"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::types::GroupingCriteria;

    fn event(payload: Value, summary: Option<&str>) -> HookEvent {
        HookEvent {
            id: Some(1),
            source_app: "app".to_string(),
            session_id: "s".to_string(),
            hook_event_type: "PreToolUse".to_string(),
            payload,
            chat: None,
            summary: summary.map(str::to_string),
            timestamp: 1,
        }
    }

    #[test]
    fn file_path_wins_over_command() {
        let chip = extract_chip(&event(
            json!({ "tool_input": { "file_path": "/src/lib/main.rs", "command": "ls" } }),
            None,
        ));
        assert_eq!(chip.as_deref(), Some("main.rs"));
    }

    #[test]
    fn non_object_tool_input_keeps_tool_name() {
        for input in [json!("ls -la"), json!(["ls"]), json!(42), Value::Null] {
            let payload = json!({ "tool_name": "Bash", "tool_input": input });
            let payload = ToolPayload::from_event(&event(payload, None));
            assert_eq!(payload.tool_name.as_deref(), Some("Bash"));
            assert_eq!(payload.tool_input, None);
        }
    }

    #[test]
    fn trailing_slash_keeps_full_path() {
        let chip = extract_chip(&event(json!({ "tool_input": { "file_path": "/tmp/" } }), None));
        assert_eq!(chip.as_deref(), Some("/tmp/"));
    }

    #[test]
    fn long_command_is_truncated() {
        let command = "cargo test --workspace --all-features -- --nocapture";
        let chip = extract_chip(&event(json!({ "tool_input": { "command": command } }), None))
            .expect("chip");
        assert_eq!(chip, format!("{}...", &command[..40]));
        let short = extract_chip(&event(json!({ "tool_input": { "command": "ls -la" } }), None));
        assert_eq!(short.as_deref(), Some("ls -la"));
    }

    #[test]
    fn summary_patterns() {
        let read = extract_chip(&event(json!({}), Some("Read  notes.md ")));
        assert_eq!(read.as_deref(), Some("notes.md"));
        let write = extract_chip(&event(json!({}), Some("write to out.txt")));
        assert_eq!(write.as_deref(), Some("out.txt"));
        let other = extract_chip(&event(json!({}), Some("Agent finished the task")));
        assert_eq!(other.as_deref(), Some("Agent finished the task"));
    }

    #[test]
    fn unknown_shapes_have_no_chip() {
        assert_eq!(extract_chip(&event(json!([1, 2, 3]), None)), None);
        assert_eq!(extract_chip(&event(json!({ "tool_input": "oops" }), None)), None);
        assert_eq!(
            extract_chip(&event(json!({ "tool_input": { "command": 42 } }), Some(""))),
            None
        );
    }

    #[test]
    fn payload_tool_name_ignores_non_strings() {
        let payload = ToolPayload::from_event(&event(json!({ "tool_name": 7 }), None));
        assert_eq!(payload.tool_name, None);
        let payload = ToolPayload::from_event(&event(json!({ "tool_name": "" }), None));
        assert_eq!(payload.tool_name, None);
    }

    fn group(tool: Option<&str>, events: Vec<HookEvent>) -> EventGroup {
        EventGroup {
            id: "group-1".to_string(),
            criteria: GroupingCriteria {
                session_id: "s".to_string(),
                source_app: "app".to_string(),
                event_type: "PostToolUse".to_string(),
                tool_name: tool.map(str::to_string),
            },
            count: events.len(),
            chips: Vec::new(),
            start_time: 0,
            end_time: 0,
            last_updated: 0,
            events,
        }
    }

    #[test]
    fn summaries_by_tool() {
        let reads = vec![
            event(json!({ "tool_input": { "file_path": "/a/b.rs" } }), None),
            event(json!({ "tool_input": { "file_path": "/a/Makefile" } }), None),
            event(json!({ "tool_input": { "file_path": "/a/c.toml" } }), None),
        ];
        assert_eq!(group_summary(&group(Some("Read"), reads)), "Read 2 files");
        let single = vec![event(json!({ "tool_input": { "file_path": "x.md" } }), None)];
        assert_eq!(group_summary(&group(Some("read"), single)), "Read 1 file");
        assert_eq!(
            group_summary(&group(Some("Read"), vec![event(json!({}), None)])),
            "Read operations"
        );
        assert_eq!(group_summary(&group(Some("MultiEdit"), vec![])), "Edit operations");
        assert_eq!(group_summary(&group(Some("Bash"), vec![])), "Command executions");
        assert_eq!(group_summary(&group(Some("Task"), vec![])), "Agent tasks");
        assert_eq!(group_summary(&group(Some("Grep"), vec![])), "Grep operations");
        assert_eq!(group_summary(&group(None, vec![])), "PostToolUse operations");
    }
}
