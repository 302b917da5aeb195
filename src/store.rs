//! Result and content store collaborators
//!
//! The core owns no backend. It talks to two abstract collaborators: a
//! [`ContentStore`] that yields the test bank once, and an append-only
//! [`ResultStore`] holding [`ScoreEvent`]s with key-range queries and push
//! notifications. Notifications are delivered as an unordered stream of
//! [`StoreEvent`]s over a [`Subscription`] handle that the client drains
//! from its single-threaded loop; dropping the handle detaches the
//! listener.
//!
//! [`MemoryStore`] is the in-process reference implementation used by the
//! test suite and usable as an offline backend.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard, mpsc},
};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::Uuid;

use crate::{quiz::Test, round::Round};

/// Store-assigned identity of one appended [`ScoreEvent`]
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct EventKey(Uuid);

impl EventKey {
    /// Assigns a fresh event key
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventKey {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EventKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// An immutable record of one player's outcome for one round
///
/// Appended once, never mutated. Uniqueness per `(username, roundId)` is a
/// client-side policy upheld by the submission guard, not a store
/// guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEvent {
    /// Self-asserted player name
    pub username: String,
    /// Count of correct items
    pub score: u32,
    /// Count of gradable items
    pub total: u32,
    /// Submission date, `YYYY-MM-DD` (UTC)
    pub date: String,
    /// Submission time of day, `HH:MM:SS` (UTC)
    pub time: String,
    /// The content the round referenced
    pub test_id: String,
    /// The round this outcome belongs to
    pub round_id: String,
}

impl ScoreEvent {
    /// Builds the event for one submission at wall-clock `now_ms`
    pub fn record(username: &str, round: &Round, score: u32, total: u32, now_ms: i64) -> Self {
        let stamp =
            chrono::DateTime::from_timestamp_millis(now_ms).unwrap_or(chrono::DateTime::UNIX_EPOCH);
        Self {
            username: username.to_owned(),
            score,
            total,
            date: stamp.format("%Y-%m-%d").to_string(),
            time: stamp.format("%H:%M:%S").to_string(),
            test_id: round.test_id.clone(),
            round_id: round.id.clone(),
        }
    }
}

/// One push notification from a subscribed range
///
/// Arrival order is arbitrary; consumers must converge regardless.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// An event entered the subscribed range
    Added(EventKey, ScoreEvent),
    /// An event left the subscribed range (e.g. a round reset upstream)
    Removed(EventKey),
}

/// Errors from the store collaborators
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The append was rejected or the backend was unreachable
    #[error("result store write failed: {0}")]
    Write(String),
    /// The content bank could not be loaded
    #[error("content bank unavailable: {0}")]
    Content(String),
}

/// Read-only source of the test bank, loaded once per process
pub trait ContentStore {
    /// Loads the full bank
    ///
    /// # Errors
    ///
    /// Returns [`Error::Content`] when the bank is unavailable; callers
    /// treat this as a recoverable race and retry on the next signal.
    fn load(&self) -> Result<Vec<Test>, Error>;
}

impl ContentStore for Vec<Test> {
    fn load(&self) -> Result<Vec<Test>, Error> {
        Ok(self.clone())
    }
}

/// Append-only event store with range queries and push notifications
pub trait ResultStore {
    /// Appends an event; the store assigns and returns its key
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] when the append does not reach the store.
    fn append(&self, event: ScoreEvent) -> Result<EventKey, Error>;

    /// Snapshot of every event in the store
    fn snapshot(&self) -> Vec<(EventKey, ScoreEvent)>;

    /// Snapshot of the events for one round
    fn round_snapshot(&self, round_id: &str) -> Vec<(EventKey, ScoreEvent)>;

    /// Subscribes to add/remove notifications for one round's range
    fn subscribe_round(&self, round_id: &str) -> Subscription;

    /// Subscribes to add/remove notifications for the whole store
    fn subscribe_all(&self) -> Subscription;
}

/// A live listener on a subscribed range
///
/// The handle is a scoped resource: each leaderboard view owns exactly one,
/// and replacing it detaches the previous listener. Dropping the handle is
/// detachment; the store prunes the dead sender on its next publish.
#[derive(Debug)]
pub struct Subscription {
    rx: mpsc::Receiver<StoreEvent>,
}

impl Subscription {
    /// Creates a connected sender/subscription pair for store implementations
    pub fn channel() -> (mpsc::Sender<StoreEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }

    /// Drains every notification that has arrived since the last drain
    pub fn drain(&self) -> Vec<StoreEvent> {
        self.rx.try_iter().collect()
    }
}

struct Subscriber {
    round_filter: Option<String>,
    sender: mpsc::Sender<StoreEvent>,
}

impl Subscriber {
    fn matches(&self, round_id: &str) -> bool {
        self.round_filter.as_deref().is_none_or(|f| f == round_id)
    }
}

#[derive(Default)]
struct Inner {
    events: Vec<(EventKey, ScoreEvent)>,
    subscribers: Vec<Subscriber>,
}

impl Inner {
    /// Delivers to matching subscribers, pruning any whose handle was dropped
    fn publish(&mut self, round_id: &str, event: &StoreEvent) {
        self.subscribers.retain(|subscriber| {
            if subscriber.matches(round_id) {
                subscriber.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }
}

/// In-process [`ResultStore`] backed by a mutex-protected event list
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Removes an event by key, notifying subscribers on its range
    ///
    /// Models the teacher-side authority resetting a round. Returns whether
    /// the key was present.
    pub fn remove(&self, key: EventKey) -> bool {
        let mut inner = self.lock();
        let Some(position) = inner.events.iter().position(|(k, _)| *k == key) else {
            return false;
        };
        let (_, event) = inner.events.remove(position);
        inner.publish(&event.round_id, &StoreEvent::Removed(key));
        true
    }
}

impl ResultStore for MemoryStore {
    fn append(&self, event: ScoreEvent) -> Result<EventKey, Error> {
        let mut inner = self.lock();
        let key = EventKey::new();
        let round_id = event.round_id.clone();
        inner.events.push((key, event.clone()));
        inner.publish(&round_id, &StoreEvent::Added(key, event));
        Ok(key)
    }

    fn snapshot(&self) -> Vec<(EventKey, ScoreEvent)> {
        self.lock().events.clone()
    }

    fn round_snapshot(&self, round_id: &str) -> Vec<(EventKey, ScoreEvent)> {
        self.lock()
            .events
            .iter()
            .filter(|(_, event)| event.round_id == round_id)
            .cloned()
            .collect()
    }

    fn subscribe_round(&self, round_id: &str) -> Subscription {
        let (sender, subscription) = Subscription::channel();
        self.lock().subscribers.push(Subscriber {
            round_filter: Some(round_id.to_owned()),
            sender,
        });
        subscription
    }

    fn subscribe_all(&self) -> Subscription {
        let (sender, subscription) = Subscription::channel();
        self.lock().subscribers.push(Subscriber {
            round_filter: None,
            sender,
        });
        subscription
    }
}
