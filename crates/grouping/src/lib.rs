//! Sliding-window grouping of hook events into a compact display list, and
//! the per-id animation bookkeeping that rides on top of it.

mod animation;
mod chips;
mod engine;
mod preferences;
mod session;
mod types;

pub use animation::{
    AnimationKind, AnimationState, AnimationStates, AnimationTracker, DEFAULT_ANIMATION_MS,
    HIGHLIGHT_MS, PULSE_MS, STALE_AFTER_MS, SWEEP_INTERVAL,
};
pub use chips::{ToolPayload, extract_chip, group_summary};
pub use engine::{group_events, grouping_stats};
pub use preferences::{GroupingPreset, parse_stored_preferences};
pub use session::{GroupingSession, UPDATED_WITHIN_MS};
pub use types::{
    DisplayItem, EventGroup, GroupChangeType, GroupMeta, GroupedEvent, GroupingCriteria,
    GroupingPreferences, GroupingStats,
};
