use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use app_api::{AppContext, StreamMessage};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 256;

#[derive(Default)]
struct Subscribers {
    count: usize,
    token_task: Option<JoinHandle<()>>,
}

/// Fan-out of stream frames to every connected `/stream` client.
///
/// The token usage timer only runs while at least one client is subscribed.
#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<String>,
    subscribers: Arc<Mutex<Subscribers>>,
    context: AppContext,
    token_interval: Duration,
}

impl Broadcaster {
    pub fn new(context: AppContext, token_interval: Duration) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
            context,
            token_interval,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Must be called from within a tokio runtime.
    pub fn subscribe(&self) -> Subscription {
        let rx = self.tx.subscribe();
        let mut subscribers = self.lock();
        subscribers.count += 1;
        if subscribers.count == 1 {
            debug!("first stream subscriber; starting token usage updates");
            subscribers.token_task = Some(tokio::spawn(token_loop(
                self.tx.clone(),
                self.context.clone(),
                self.token_interval,
            )));
        }
        Subscription {
            rx,
            subscribers: self.subscribers.clone(),
        }
    }

    /// Sends a frame to all current subscribers; returns how many got it.
    pub fn publish(&self, message: &StreamMessage) -> usize {
        match serde_json::to_string(message) {
            Ok(text) => self.tx.send(text).unwrap_or(0),
            Err(err) => {
                warn!(error = %err, "failed to encode stream message");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().count
    }

    pub fn is_sending_token_usage(&self) -> bool {
        self.lock()
            .token_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

/// A live `/stream` registration; dropping it unsubscribes.
pub struct Subscription {
    rx: broadcast::Receiver<String>,
    subscribers: Arc<Mutex<Subscribers>>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Result<String, broadcast::error::RecvError> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subscribers.count = subscribers.count.saturating_sub(1);
        if subscribers.count == 0
            && let Some(task) = subscribers.token_task.take()
        {
            debug!("last stream subscriber left; stopping token usage updates");
            task.abort();
        }
    }
}

async fn token_loop(tx: broadcast::Sender<String>, context: AppContext, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let ctx = context.clone();
        let frame = match tokio::task::spawn_blocking(move || app_api::stream_token_usage(&ctx)).await
        {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "token usage task failed");
                continue;
            }
        };
        let Some(frame) = frame else {
            continue;
        };
        match serde_json::to_string(&frame) {
            Ok(text) => {
                let _ = tx.send(text);
            }
            Err(err) => warn!(error = %err, "failed to encode token usage"),
        }
    }
}

#[cfg(test)]
mod tests {
    use monitor_app::AppState;
    use monitor_core::HookEvent;
    use serde_json::{Value, json};

    use super::*;

    fn broadcaster(dir: &tempfile::TempDir) -> Broadcaster {
        let app_state = AppState::new(
            dir.path().join("events.db"),
            Some(vec![dir.path().join("claude")]),
        );
        let context = AppContext::new(app_state, dir.path().to_path_buf());
        Broadcaster::new(context, Duration::from_secs(30))
    }

    fn event() -> HookEvent {
        HookEvent {
            id: Some(1),
            source_app: "demo".to_string(),
            session_id: "s-1".to_string(),
            hook_event_type: "Stop".to_string(),
            payload: json!({}),
            chat: None,
            summary: None,
            timestamp: 1_000,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn token_updates_follow_subscriber_count() {
        let dir = tempfile::tempdir().expect("temp dir");
        let broadcaster = broadcaster(&dir);
        assert!(!broadcaster.is_sending_token_usage());

        let first = broadcaster.subscribe();
        let second = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);
        assert!(broadcaster.is_sending_token_usage());

        drop(first);
        assert!(broadcaster.is_sending_token_usage());
        drop(second);
        assert_eq!(broadcaster.subscriber_count(), 0);
        assert!(!broadcaster.is_sending_token_usage());
    }

    #[tokio::test]
    async fn published_frames_reach_every_subscriber() {
        let dir = tempfile::tempdir().expect("temp dir");
        let broadcaster = broadcaster(&dir);
        assert_eq!(broadcaster.publish(&StreamMessage::Event(event())), 0);

        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();
        assert_eq!(broadcaster.publish(&StreamMessage::Event(event())), 2);

        for subscription in [&mut first, &mut second] {
            let text = subscription.recv().await.expect("frame");
            let frame: Value = serde_json::from_str(&text).expect("json");
            assert_eq!(frame["type"], "event");
            assert_eq!(frame["data"]["source_app"], "demo");
        }
    }
}
