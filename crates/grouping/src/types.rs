use monitor_core::HookEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupingPreferences {
    pub enabled: bool,
    /// Largest gap, in milliseconds, between a group's end and the next event.
    pub time_window: i64,
    pub min_events_to_group: usize,
    pub group_by_tool: bool,
    pub group_by_session: bool,
    pub group_by_event_type: bool,
    pub max_group_size: usize,
}

impl Default for GroupingPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            time_window: 10_000,
            min_events_to_group: 2,
            group_by_tool: true,
            group_by_session: true,
            group_by_event_type: true,
            max_group_size: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingCriteria {
    pub session_id: String,
    pub source_app: String,
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

/// An open or finalised run of same-key events.
#[derive(Debug, Clone, PartialEq)]
pub struct EventGroup {
    pub id: String,
    pub criteria: GroupingCriteria,
    /// Ascending by timestamp.
    pub events: Vec<HookEvent>,
    pub start_time: i64,
    pub end_time: i64,
    pub last_updated: i64,
    pub count: usize,
    pub chips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMeta {
    /// Always `"aggregate"`.
    pub group: String,
    pub count: usize,
    pub time_range: (i64, i64),
    /// Stable group id.
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    pub chips: Vec<String>,
    pub children: Vec<HookEvent>,
    pub summary: String,
}

/// The group's first event, re-stamped with the group's end time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedEvent {
    #[serde(flatten)]
    pub event: HookEvent,
    pub is_group: bool,
    pub group_meta: GroupMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayItem {
    Group(GroupedEvent),
    Event(HookEvent),
}

impl DisplayItem {
    /// Sort key for the newest-first display order.
    pub fn effective_timestamp(&self) -> i64 {
        match self {
            Self::Group(group) => group.group_meta.time_range.1,
            Self::Event(event) => event.timestamp,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    pub fn as_group(&self) -> Option<&GroupedEvent> {
        match self {
            Self::Group(group) => Some(group),
            Self::Event(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupChangeType {
    New,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingStats {
    pub total_events: usize,
    pub processed_events: usize,
    pub grouped_count: usize,
    pub individual_count: usize,
    pub reduction_percentage: i64,
    pub average_group_size: usize,
}
