use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::types::GroupChangeType;

pub const DEFAULT_ANIMATION_MS: u64 = 1_000;
pub const PULSE_MS: u64 = 600;
pub const HIGHLIGHT_MS: u64 = 800;
/// Inactive states older than this are evicted by a sweep.
pub const STALE_AFTER_MS: i64 = 5_000;
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Enter,
    Exit,
    Update,
    Pulse,
    Highlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationState {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    pub is_active: bool,
    pub timestamp: i64,
    #[serde(skip)]
    generation: u64,
}

/// Per-id animation state with an explicit clock.
#[derive(Debug, Default)]
pub struct AnimationStates {
    states: HashMap<String, AnimationState>,
    seen: HashSet<String>,
    next_generation: u64,
}

impl AnimationStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `id` as animating and returns the trigger's generation.
    pub fn trigger(&mut self, id: &str, kind: AnimationKind, now_ms: i64) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.states.insert(
            id.to_string(),
            AnimationState {
                kind,
                is_active: true,
                timestamp: now_ms,
                generation,
            },
        );
        generation
    }

    /// Ends the animation started by `generation`. A newer trigger for the
    /// same id is left running.
    pub fn deactivate(&mut self, id: &str, generation: u64) -> bool {
        match self.states.get_mut(id) {
            Some(state) if state.generation == generation => {
                state.is_active = false;
                true
            }
            _ => false,
        }
    }

    pub fn animation_state(&self, id: &str) -> Option<AnimationState> {
        self.states.get(id).copied()
    }

    /// Only first-seen ids enter; updates always animate.
    pub fn should_animate(&mut self, id: &str, change: GroupChangeType) -> Option<AnimationKind> {
        match change {
            GroupChangeType::New => self
                .seen
                .insert(id.to_string())
                .then_some(AnimationKind::Enter),
            GroupChangeType::Updated => Some(AnimationKind::Update),
            GroupChangeType::Unchanged => None,
        }
    }

    pub fn is_animating(&self, id: &str, kind: Option<AnimationKind>) -> bool {
        match self.states.get(id) {
            Some(state) if state.is_active => kind.is_none_or(|kind| state.kind == kind),
            _ => false,
        }
    }

    /// Deactivates states triggered more than `duration_ms` ago; returns how
    /// many. For hosts that poll instead of running deactivation timers.
    pub fn expire(&mut self, now_ms: i64, duration_ms: i64) -> usize {
        let mut expired = 0;
        for state in self.states.values_mut() {
            if state.is_active && now_ms - state.timestamp >= duration_ms {
                state.is_active = false;
                expired += 1;
            }
        }
        expired
    }

    /// Drops inactive states older than [`STALE_AFTER_MS`]; returns how many.
    pub fn sweep(&mut self, now_ms: i64) -> usize {
        let before = self.states.len();
        self.states
            .retain(|_, state| state.is_active || now_ms - state.timestamp <= STALE_AFTER_MS);
        before - self.states.len()
    }

    /// Drops every animation state. Ids already seen stay seen.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Clock {
    started: Instant,
    started_ms: i64,
}

impl Clock {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            started_ms: Utc::now().timestamp_millis(),
        }
    }

    fn now_ms(&self) -> i64 {
        self.started_ms + self.started.elapsed().as_millis() as i64
    }
}

fn lock(states: &Mutex<AnimationStates>) -> MutexGuard<'_, AnimationStates> {
    states.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Timer-driven wrapper over [`AnimationStates`].
///
/// Must be created inside a tokio runtime. Deactivation timers and the
/// periodic sweep are tasks owned by the tracker; `destroy` (or drop) aborts
/// them all.
#[derive(Debug)]
pub struct AnimationTracker {
    states: Arc<Mutex<AnimationStates>>,
    timers: Mutex<Vec<JoinHandle<()>>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    clock: Clock,
}

impl AnimationTracker {
    pub fn new() -> Self {
        let states = Arc::new(Mutex::new(AnimationStates::new()));
        let clock = Clock::new();
        let sweeper = {
            let states = Arc::clone(&states);
            tokio::spawn(async move {
                let mut interval =
                    tokio::time::interval_at(Instant::now() + SWEEP_INTERVAL, SWEEP_INTERVAL);
                loop {
                    interval.tick().await;
                    let removed = lock(&states).sweep(clock.now_ms());
                    if removed > 0 {
                        tracing::debug!(removed, "swept stale animation states");
                    }
                }
            })
        };
        Self {
            states,
            timers: Mutex::new(Vec::new()),
            sweeper: Mutex::new(Some(sweeper)),
            clock,
        }
    }

    pub fn trigger_animation(&self, id: &str, kind: AnimationKind, duration: Duration) {
        let generation = lock(&self.states).trigger(id, kind, self.clock.now_ms());
        let states = Arc::clone(&self.states);
        let id = id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            lock(&states).deactivate(&id, generation);
        });
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        timers.retain(|timer| !timer.is_finished());
        timers.push(handle);
    }

    pub fn pulse_card(&self, id: &str) {
        self.trigger_animation(id, AnimationKind::Pulse, Duration::from_millis(PULSE_MS));
    }

    pub fn highlight_change(&self, id: &str) {
        self.trigger_animation(
            id,
            AnimationKind::Highlight,
            Duration::from_millis(HIGHLIGHT_MS),
        );
    }

    pub fn should_animate(&self, id: &str, change: GroupChangeType) -> Option<AnimationKind> {
        lock(&self.states).should_animate(id, change)
    }

    /// `should_animate`, then trigger with the default duration.
    pub fn process_event_animation(
        &self,
        id: &str,
        change: GroupChangeType,
    ) -> Option<AnimationKind> {
        let kind = self.should_animate(id, change)?;
        self.trigger_animation(id, kind, Duration::from_millis(DEFAULT_ANIMATION_MS));
        Some(kind)
    }

    pub fn animation_state(&self, id: &str) -> Option<AnimationState> {
        lock(&self.states).animation_state(id)
    }

    pub fn is_animating(&self, id: &str, kind: Option<AnimationKind>) -> bool {
        lock(&self.states).is_animating(id, kind)
    }

    pub fn sweep(&self) -> usize {
        lock(&self.states).sweep(self.clock.now_ms())
    }

    pub fn destroy(&self) {
        if let Some(sweeper) = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            sweeper.abort();
        }
        for timer in self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
        {
            timer.abort();
        }
        lock(&self.states).clear();
    }
}

impl Default for AnimationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AnimationTracker {
    fn drop(&mut self) {
        self.destroy();
    }
}
