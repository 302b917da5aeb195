//! Leaderboard aggregation
//!
//! Two live views over the result store. [`RoundBoard`] ranks the outcomes
//! of a single round; [`GlobalBoard`] aggregates every event per player
//! across all rounds. Both own a store [`Subscription`] and are pumped from
//! the host loop; events may arrive in any order and duplicates of an
//! already-known key are ignored, so the rendered rows converge to the
//! store contents regardless of delivery order.
//!
//! Subscription happens before the initial snapshot is read. An event both
//! present in the snapshot and delivered as a notification is deduplicated
//! by key, so nothing is lost or double-counted in the gap.

use std::cmp::Reverse;

use itertools::Itertools;
use serde::Serialize;

use crate::store::{EventKey, ResultStore, ScoreEvent, StoreEvent, Subscription};

/// One rendered row of a round leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRow {
    /// Player name
    pub username: String,
    /// Correct items
    pub score: u32,
    /// Gradable items
    pub total: u32,
    /// Submission time of day, used for display and tie-breaking
    pub time: String,
}

/// Live ranking of one round's outcomes
///
/// Order: score descending, then submission time ascending (the earlier
/// submission wins the tie), then username for a stable total order.
#[derive(Debug)]
pub struct RoundBoard {
    round_id: String,
    entries: Vec<(EventKey, ScoreEvent)>,
    subscription: Subscription,
}

impl RoundBoard {
    /// Attaches a board to one round's range of the store
    pub fn subscribe<R: ResultStore>(store: &R, round_id: &str) -> Self {
        let subscription = store.subscribe_round(round_id);
        let mut board = Self {
            round_id: round_id.to_owned(),
            entries: Vec::new(),
            subscription,
        };
        for (key, event) in store.round_snapshot(round_id) {
            board.insert(key, event);
        }
        board.sort();
        board
    }

    /// The round this board ranks
    pub fn round_id(&self) -> &str {
        &self.round_id
    }

    fn insert(&mut self, key: EventKey, event: ScoreEvent) {
        if event.round_id != self.round_id {
            return;
        }
        if self.entries.iter().any(|(k, _)| *k == key) {
            return;
        }
        self.entries.push((key, event));
    }

    fn sort(&mut self) {
        self.entries.sort_by(|(_, a), (_, b)| {
            (Reverse(a.score), &a.time, &a.username).cmp(&(Reverse(b.score), &b.time, &b.username))
        });
    }

    /// Applies pending notifications; returns whether the rows changed
    pub fn pump<R: ResultStore>(&mut self, store: &R) -> bool {
        let mut changed = false;
        let mut removed = false;
        for notification in self.subscription.drain() {
            match notification {
                StoreEvent::Added(key, event) => {
                    let before = self.entries.len();
                    self.insert(key, event);
                    changed |= self.entries.len() != before;
                }
                StoreEvent::Removed(_) => removed = true,
            }
        }
        if removed {
            // A removal invalidates local state; rebuild from the store.
            self.entries.clear();
            for (key, event) in store.round_snapshot(&self.round_id) {
                self.insert(key, event);
            }
            changed = true;
        }
        if changed {
            self.sort();
        }
        changed
    }

    /// The current rows, best first
    pub fn rows(&self) -> Vec<RoundRow> {
        self.entries
            .iter()
            .map(|(_, event)| RoundRow {
                username: event.username.clone(),
                score: event.score,
                total: event.total,
                time: event.time.clone(),
            })
            .collect()
    }
}

/// One rendered row of the global leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalRow {
    /// Player name
    pub username: String,
    /// Correct items across all rounds
    pub correct: u32,
    /// Gradable items across all rounds
    pub total: u32,
    /// Distinct rounds the player appears in
    pub rounds: usize,
}

impl GlobalRow {
    /// Accuracy percentage with one decimal, e.g. `66.7`
    ///
    /// A zero total is treated as one to keep the ratio defined.
    pub fn percent(&self) -> f64 {
        let total = self.total.max(1);
        (f64::from(self.correct) * 1000.0 / f64::from(total)).round() / 10.0
    }
}

/// Live per-player aggregation across every round
///
/// Order: correct answers descending, then accuracy descending, then
/// username for a stable total order.
#[derive(Debug)]
pub struct GlobalBoard {
    rows: Vec<GlobalRow>,
    subscription: Subscription,
}

impl GlobalBoard {
    /// Attaches a board to the whole store
    pub fn subscribe<R: ResultStore>(store: &R) -> Self {
        let subscription = store.subscribe_all();
        let mut board = Self {
            rows: Vec::new(),
            subscription,
        };
        board.recompute(store);
        board
    }

    /// Aggregation is cheap at classroom scale, so any notification
    /// triggers a full recompute from the store snapshot.
    fn recompute<R: ResultStore>(&mut self, store: &R) {
        self.rows = store
            .snapshot()
            .into_iter()
            .map(|(_, event)| event)
            .into_group_map_by(|event| event.username.clone())
            .into_iter()
            .map(|(username, events)| GlobalRow {
                username,
                correct: events.iter().map(|event| event.score).sum(),
                total: events.iter().map(|event| event.total).sum(),
                rounds: events
                    .iter()
                    .map(|event| event.round_id.as_str())
                    .unique()
                    .count(),
            })
            .collect();
        self.rows.sort_by(|a, b| {
            b.correct
                .cmp(&a.correct)
                .then_with(|| b.percent().total_cmp(&a.percent()))
                .then_with(|| a.username.cmp(&b.username))
        });
    }

    /// Applies pending notifications; returns whether the rows changed
    pub fn pump<R: ResultStore>(&mut self, store: &R) -> bool {
        if self.subscription.drain().is_empty() {
            return false;
        }
        let before = self.rows.clone();
        self.recompute(store);
        self.rows != before
    }

    /// The current rows, best first
    pub fn rows(&self) -> &[GlobalRow] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn event(username: &str, round_id: &str, score: u32, total: u32, time: &str) -> ScoreEvent {
        ScoreEvent {
            username: username.to_owned(),
            score,
            total,
            date: "2024-03-01".to_owned(),
            time: time.to_owned(),
            test_id: "t1".to_owned(),
            round_id: round_id.to_owned(),
        }
    }

    #[test]
    fn test_round_board_orders_by_score_then_time() {
        let store = MemoryStore::new();
        store.append(event("Ben", "r1", 2, 3, "10:00:05")).unwrap();
        store.append(event("Ana", "r1", 3, 3, "10:00:09")).unwrap();
        store.append(event("Cyn", "r1", 2, 3, "10:00:01")).unwrap();

        let board = RoundBoard::subscribe(&store, "r1");
        let names: Vec<_> = board.rows().into_iter().map(|row| row.username).collect();
        // Earlier submission wins the score tie.
        assert_eq!(names, ["Ana", "Cyn", "Ben"]);
    }

    #[test]
    fn test_round_board_converges_regardless_of_arrival_order() {
        let store = MemoryStore::new();
        store.append(event("Ana", "r1", 3, 3, "10:00:09")).unwrap();

        let mut board = RoundBoard::subscribe(&store, "r1");
        store.append(event("Cyn", "r1", 2, 3, "10:00:01")).unwrap();
        store.append(event("Ben", "r1", 2, 3, "10:00:05")).unwrap();
        store.append(event("Dee", "r2", 9, 9, "10:00:00")).unwrap();

        assert!(board.pump(&store));
        let names: Vec<_> = board.rows().into_iter().map(|row| row.username).collect();
        assert_eq!(names, ["Ana", "Cyn", "Ben"]);
        assert!(!board.pump(&store));
    }

    #[test]
    fn test_round_board_ignores_duplicate_keys() {
        let store = MemoryStore::new();
        // Subscribe before the snapshot is read: the append lands in both
        // the notification stream and the snapshot.
        let subscription = store.subscribe_round("r1");
        store.append(event("Ana", "r1", 3, 3, "10:00:00")).unwrap();
        drop(subscription);

        let mut board = RoundBoard::subscribe(&store, "r1");
        store.append(event("Ben", "r1", 1, 3, "10:00:02")).unwrap();
        board.pump(&store);
        board.pump(&store);
        assert_eq!(board.rows().len(), 2);
    }

    #[test]
    fn test_round_board_rebuilds_after_removal() {
        let store = MemoryStore::new();
        let key = store.append(event("Ana", "r1", 3, 3, "10:00:00")).unwrap();
        store.append(event("Ben", "r1", 1, 3, "10:00:02")).unwrap();

        let mut board = RoundBoard::subscribe(&store, "r1");
        assert_eq!(board.rows().len(), 2);

        store.remove(key);
        assert!(board.pump(&store));
        let rows = board.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].username, "Ben");
    }

    #[test]
    fn test_global_board_aggregates_per_player() {
        let store = MemoryStore::new();
        store.append(event("Ana", "r1", 2, 3, "10:00:00")).unwrap();
        store.append(event("Ana", "r2", 3, 3, "11:00:00")).unwrap();
        store.append(event("Ben", "r1", 3, 3, "10:00:01")).unwrap();

        let board = GlobalBoard::subscribe(&store);
        let rows = board.rows();
        assert_eq!(rows[0].username, "Ana");
        assert_eq!(rows[0].correct, 5);
        assert_eq!(rows[0].total, 6);
        assert_eq!(rows[0].rounds, 2);
        assert_eq!(rows[1].username, "Ben");
    }

    #[test]
    fn test_global_board_breaks_ties_by_accuracy() {
        let store = MemoryStore::new();
        store.append(event("Ana", "r1", 3, 6, "10:00:00")).unwrap();
        store.append(event("Ben", "r1", 3, 4, "10:00:01")).unwrap();

        let board = GlobalBoard::subscribe(&store);
        let rows = board.rows();
        assert_eq!(rows[0].username, "Ben");
        assert_eq!(rows[0].percent(), 75.0);
        assert_eq!(rows[1].percent(), 50.0);
    }

    #[test]
    fn test_global_percent_one_decimal_and_zero_guard() {
        let row = GlobalRow {
            username: "Ana".to_owned(),
            correct: 2,
            total: 3,
            rounds: 1,
        };
        assert_eq!(row.percent(), 66.7);

        let empty = GlobalRow {
            username: "Ben".to_owned(),
            correct: 0,
            total: 0,
            rounds: 1,
        };
        assert_eq!(empty.percent(), 0.0);
    }

    #[test]
    fn test_global_board_pump_tracks_new_events() {
        let store = MemoryStore::new();
        let mut board = GlobalBoard::subscribe(&store);
        assert!(!board.pump(&store));

        store.append(event("Ana", "r1", 2, 3, "10:00:00")).unwrap();
        assert!(board.pump(&store));
        assert_eq!(board.rows().len(), 1);
    }
}
