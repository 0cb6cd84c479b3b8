use std::collections::HashMap;

use crate::types::GroupChangeType;

/// A group touched within this many milliseconds counts as updated.
pub const UPDATED_WITHIN_MS: i64 = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GroupState {
    count: usize,
    last_update: i64,
    first_pass: u64,
}

/// Identity and change state that outlives a single grouping pass.
///
/// Create one per monitoring session. Group keys map to `group-N` ids that
/// are never reassigned, so the display layer can key transitions off them.
#[derive(Debug, Default)]
pub struct GroupingSession {
    next_id: u64,
    pass: u64,
    ids: HashMap<String, String>,
    states: HashMap<String, GroupState>,
}

impl GroupingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stable_id(&mut self, key: &str) -> String {
        if let Some(id) = self.ids.get(key) {
            return id.clone();
        }
        self.next_id += 1;
        let id = format!("group-{}", self.next_id);
        self.ids.insert(key.to_string(), id.clone());
        id
    }

    pub(crate) fn begin_pass(&mut self) {
        self.pass += 1;
    }

    pub(crate) fn record(&mut self, id: &str, count: usize, last_update: i64) {
        let pass = self.pass;
        self.states
            .entry(id.to_string())
            .and_modify(|state| {
                state.count = count;
                state.last_update = last_update;
            })
            .or_insert(GroupState {
                count,
                last_update,
                first_pass: pass,
            });
    }

    pub fn change_type(&self, id: &str, now_ms: i64) -> GroupChangeType {
        match self.states.get(id) {
            None => GroupChangeType::New,
            Some(state) if now_ms - state.last_update < UPDATED_WITHIN_MS => {
                GroupChangeType::Updated
            }
            Some(_) => GroupChangeType::Unchanged,
        }
    }

    /// True when the latest pass was the first to record `id`.
    pub fn first_recorded_in_last_pass(&self, id: &str) -> bool {
        self.states
            .get(id)
            .is_some_and(|state| state.first_pass == self.pass)
    }

    /// Last recorded member count for a group id.
    pub fn recorded_count(&self, id: &str) -> Option<usize> {
        self.states.get(id).map(|state| state.count)
    }

    pub fn known_groups(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_ids_are_monotonic_and_reused() {
        let mut session = GroupingSession::new();
        assert_eq!(session.stable_id("s|app|PreToolUse|Bash"), "group-1");
        assert_eq!(session.stable_id("s|app|PreToolUse|Read"), "group-2");
        assert_eq!(session.stable_id("s|app|PreToolUse|Bash"), "group-1");
        assert_eq!(session.known_groups(), 2);
    }

    #[test]
    fn change_type_follows_last_update() {
        let mut session = GroupingSession::new();
        assert_eq!(session.change_type("group-1", 10_000), GroupChangeType::New);
        session.record("group-1", 3, 10_000);
        assert_eq!(
            session.change_type("group-1", 11_999),
            GroupChangeType::Updated
        );
        assert_eq!(
            session.change_type("group-1", 12_000),
            GroupChangeType::Unchanged
        );
        assert_eq!(session.recorded_count("group-1"), Some(3));
    }

    #[test]
    fn first_pass_is_remembered_per_group() {
        let mut session = GroupingSession::new();
        session.begin_pass();
        session.record("group-1", 1, 0);
        assert!(session.first_recorded_in_last_pass("group-1"));

        session.begin_pass();
        session.record("group-1", 2, 500);
        session.record("group-2", 1, 500);
        assert!(!session.first_recorded_in_last_pass("group-1"));
        assert!(session.first_recorded_in_last_pass("group-2"));
        assert!(!session.first_recorded_in_last_pass("group-3"));
        assert_eq!(session.recorded_count("group-1"), Some(2));
    }
}
