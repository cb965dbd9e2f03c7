//! Per-session change fan-out.
//!
//! Commits on different handles can finish publishing out of order, so each
//! session topic remembers the last revision it delivered and holds early
//! arrivals until the gap fills. Duplicates (a revision at or below the last
//! delivered) are dropped.

use super::events::SessionEvent;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub trait ChangeNotifier: Send + Sync {
    /// Hand a committed event to the session's subscribers
    fn publish(&self, event: SessionEvent);

    fn subscribe(&self, session_id: &str) -> Subscription;

    /// Returns false if no such subscription was registered
    fn unsubscribe(&self, session_id: &str, subscription_id: u64) -> bool;
}

/// Receiving end of a session subscription
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    session_id: String,
    receiver: mpsc::UnboundedReceiver<SessionEvent>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Wait for the next event; `None` once the notifier drops this subscriber
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        self.receiver.try_recv().ok()
    }

    /// Everything delivered so far, without waiting
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

#[derive(Default)]
struct Topic {
    subscribers: Vec<(u64, mpsc::UnboundedSender<SessionEvent>)>,
    last_delivered: Option<i64>,
    pending: BTreeMap<i64, SessionEvent>,
}

impl Topic {
    fn accept(&mut self, event: SessionEvent, max_pending: usize) {
        if let Some(last) = self.last_delivered {
            if event.revision <= last {
                debug!(
                    "Dropping stale event r{} for session {} (delivered up to r{})",
                    event.revision, event.session_id, last
                );
                return;
            }

            if event.revision > last + 1 {
                self.pending.insert(event.revision, event);
                if self.pending.len() <= max_pending {
                    return;
                }

                if let Some((revision, earliest)) = self.pending.pop_first() {
                    warn!(
                        "Skipping revisions r{}..r{} for session {}",
                        last + 1,
                        revision - 1,
                        earliest.session_id
                    );
                    self.deliver(earliest);
                }
                self.drain_pending();
                return;
            }
        }

        self.deliver(event);
        self.drain_pending();
    }

    fn drain_pending(&mut self) {
        while let Some(last) = self.last_delivered {
            match self.pending.remove(&(last + 1)) {
                Some(next) => self.deliver(next),
                None => break,
            }
        }
    }

    fn deliver(&mut self, event: SessionEvent) {
        self.last_delivered = Some(event.revision);
        self.subscribers
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
    }
}

/// In-process notifier backed by tokio channels
pub struct ChannelNotifier {
    topics: Mutex<HashMap<String, Topic>>,
    next_id: AtomicU64,
    max_pending: usize,
}

impl ChannelNotifier {
    pub fn new(max_pending: usize) -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            max_pending,
        }
    }

    fn topics(&self) -> MutexGuard<'_, HashMap<String, Topic>> {
        self.topics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscriber_count(&self, session_id: &str) -> usize {
        self.topics()
            .get(session_id)
            .map(|topic| {
                topic
                    .subscribers
                    .iter()
                    .filter(|(_, sender)| !sender.is_closed())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Revision of the last event handed to subscribers of `session_id`
    pub fn last_delivered(&self, session_id: &str) -> Option<i64> {
        self.topics().get(session_id).and_then(|t| t.last_delivered)
    }
}

impl Default for ChannelNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ChangeNotifier for ChannelNotifier {
    fn publish(&self, event: SessionEvent) {
        let mut topics = self.topics();
        let topic = topics.entry(event.session_id.clone()).or_default();
        topic.accept(event, self.max_pending);
    }

    fn subscribe(&self, session_id: &str) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.topics()
            .entry(session_id.to_string())
            .or_default()
            .subscribers
            .push((id, sender));
        debug!("Subscription {} opened on session {}", id, session_id);

        Subscription {
            id,
            session_id: session_id.to_string(),
            receiver,
        }
    }

    fn unsubscribe(&self, session_id: &str, subscription_id: u64) -> bool {
        let mut topics = self.topics();
        let Some(topic) = topics.get_mut(session_id) else {
            return false;
        };

        let before = topic.subscribers.len();
        topic.subscribers.retain(|(id, _)| *id != subscription_id);
        before != topic.subscribers.len()
    }
}
