use std::collections::HashMap;

use monitor_core::HookEvent;

use crate::chips::{ToolPayload, extract_chip, group_summary};
use crate::session::GroupingSession;
use crate::types::{
    DisplayItem, EventGroup, GroupMeta, GroupedEvent, GroupingCriteria, GroupingPreferences,
    GroupingStats,
};

fn group_key(event: &HookEvent, tool_name: Option<&str>, prefs: &GroupingPreferences) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(4);
    if prefs.group_by_session {
        parts.push(&event.session_id);
    }
    parts.push(&event.source_app);
    if prefs.group_by_event_type {
        parts.push(&event.hook_event_type);
    }
    if prefs.group_by_tool
        && let Some(tool) = tool_name
    {
        parts.push(tool);
    }
    parts.join("|")
}

fn open_group(id: String, event: &HookEvent, tool_name: Option<String>) -> EventGroup {
    EventGroup {
        id,
        criteria: GroupingCriteria {
            session_id: event.session_id.clone(),
            source_app: event.source_app.clone(),
            event_type: event.hook_event_type.clone(),
            tool_name,
        },
        events: vec![event.clone()],
        start_time: event.timestamp,
        end_time: event.timestamp,
        last_updated: event.timestamp,
        count: 1,
        chips: extract_chip(event).into_iter().collect(),
    }
}

fn grouped_event(group: EventGroup) -> Option<GroupedEvent> {
    let summary = group_summary(&group);
    let mut chips: Vec<String> = Vec::with_capacity(group.chips.len());
    for chip in group.chips {
        if !chips.contains(&chip) {
            chips.push(chip);
        }
    }
    let mut base = group.events.first()?.clone();
    base.timestamp = group.end_time;
    Some(GroupedEvent {
        event: base,
        is_group: true,
        group_meta: GroupMeta {
            group: "aggregate".to_string(),
            count: group.count,
            time_range: (group.start_time, group.end_time),
            key: group.id,
            tool: group.criteria.tool_name,
            chips,
            children: group.events,
            summary,
        },
    })
}

fn emit(group: EventGroup, prefs: &GroupingPreferences, out: &mut Vec<DisplayItem>) {
    if group.count >= prefs.min_events_to_group {
        if let Some(grouped) = grouped_event(group) {
            out.push(DisplayItem::Group(grouped));
        }
    } else {
        out.extend(group.events.into_iter().map(DisplayItem::Event));
    }
}

/// One grouping pass over `events`, newest first.
///
/// Deterministic for a given input and session history. The session keeps the
/// key to id mapping and the per-group change state across passes.
pub fn group_events(
    events: &[HookEvent],
    prefs: &GroupingPreferences,
    session: &mut GroupingSession,
) -> Vec<DisplayItem> {
    if !prefs.enabled {
        return events.iter().cloned().map(DisplayItem::Event).collect();
    }
    session.begin_pass();

    let mut sorted: Vec<&HookEvent> = events.iter().collect();
    sorted.sort_by_key(|event| event.timestamp);

    let mut out = Vec::with_capacity(events.len());
    // Open groups in first-opened order; a replacement keeps the slot.
    let mut open: Vec<EventGroup> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for event in sorted {
        let tool_name = ToolPayload::from_event(event).tool_name;
        let key = group_key(event, tool_name.as_deref(), prefs);

        if let Some(&slot) = slots.get(&key) {
            let group = &mut open[slot];
            if event.timestamp - group.end_time <= prefs.time_window
                && group.count < prefs.max_group_size
            {
                group.events.push(event.clone());
                group.end_time = event.timestamp;
                group.last_updated = event.timestamp;
                group.count += 1;
                session.record(&group.id, group.count, event.timestamp);
                if let Some(chip) = extract_chip(event)
                    && !group.chips.contains(&chip)
                {
                    group.chips.push(chip);
                }
                continue;
            }
            let id = session.stable_id(&key);
            session.record(&id, 1, event.timestamp);
            let finished = std::mem::replace(group, open_group(id, event, tool_name));
            emit(finished, prefs, &mut out);
            continue;
        }

        let id = session.stable_id(&key);
        session.record(&id, 1, event.timestamp);
        slots.insert(key, open.len());
        open.push(open_group(id, event, tool_name));
    }

    for group in open {
        emit(group, prefs, &mut out);
    }

    out.sort_by(|left, right| right.effective_timestamp().cmp(&left.effective_timestamp()));
    out
}

pub fn grouping_stats(total_events: usize, items: &[DisplayItem]) -> GroupingStats {
    let processed_events = items.len();
    let group_sizes: Vec<usize> = items
        .iter()
        .filter_map(DisplayItem::as_group)
        .map(|group| group.group_meta.count)
        .collect();
    let grouped_count = group_sizes.len();
    let reduction_percentage = if total_events > 0 {
        ((1.0 - processed_events as f64 / total_events as f64) * 100.0).round() as i64
    } else {
        0
    };
    let average_group_size = if grouped_count > 0 {
        (group_sizes.iter().sum::<usize>() as f64 / grouped_count as f64).round() as usize
    } else {
        0
    };
    GroupingStats {
        total_events,
        processed_events,
        grouped_count,
        individual_count: processed_events - grouped_count,
        reduction_percentage,
        average_group_size,
    }
}
