use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use grouping::{
    AnimationKind, AnimationStates, DEFAULT_ANIMATION_MS, DisplayItem, GroupChangeType,
    GroupingSession, GroupingStats, group_events, grouping_stats, parse_stored_preferences,
};
use serde::Serialize;

use crate::error::Result;
use crate::services::{SharedConfig, open_db};
use crate::util::time::now_millis;

/// Result of one grouping pass as served to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedView {
    pub items: Vec<DisplayItem>,
    pub stats: GroupingStats,
    /// Keyed by stable group id.
    pub change_types: BTreeMap<String, GroupChangeType>,
    pub animations: BTreeMap<String, AnimationKind>,
}

#[derive(Default)]
struct GroupingState {
    session: GroupingSession,
    animations: AnimationStates,
}

/// Runs grouping passes against the shared identity and change maps.
#[derive(Clone)]
pub struct GroupingService {
    config: SharedConfig,
    state: Arc<Mutex<GroupingState>>,
}

impl GroupingService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(GroupingState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GroupingState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Groups the latest `limit` events with the stored preferences.
    pub fn grouped(&self, limit: usize) -> Result<GroupedView> {
        let db = open_db(&self.config)?;
        let events = db.recent_events(limit)?;
        let raw_prefs = db.get_grouping_preferences_json()?;
        let prefs = parse_stored_preferences(raw_prefs.as_deref());
        drop(db);

        let now = now_millis();
        let mut state = self.lock();
        let GroupingState {
            session,
            animations,
        } = &mut *state;
        let items = group_events(&events, &prefs, session);

        let mut change_types = BTreeMap::new();
        let mut kinds = BTreeMap::new();
        for group in items.iter().filter_map(DisplayItem::as_group) {
            let id = &group.group_meta.key;
            let change = if session.first_recorded_in_last_pass(id) {
                GroupChangeType::New
            } else {
                session.change_type(id, now)
            };
            if let Some(kind) = animations.should_animate(id, change) {
                animations.trigger(id, kind, now);
                kinds.insert(id.clone(), kind);
            }
            change_types.insert(id.clone(), change);
        }
        animations.expire(now, DEFAULT_ANIMATION_MS as i64);
        animations.sweep(now);

        Ok(GroupedView {
            stats: grouping_stats(events.len(), &items),
            items,
            change_types,
            animations: kinds,
        })
    }

    pub fn known_groups(&self) -> usize {
        self.lock().session.known_groups()
    }

    /// Animation states still held, active or awaiting eviction.
    pub fn tracked_animations(&self) -> usize {
        self.lock().animations.len()
    }

    /// Expires and sweeps animation states as of `now_ms`.
    pub fn sweep_animations(&self, now_ms: i64) -> usize {
        let mut state = self.lock();
        state.animations.expire(now_ms, DEFAULT_ANIMATION_MS as i64);
        state.animations.sweep(now_ms)
    }
}
