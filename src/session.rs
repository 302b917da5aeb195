//! Player session state
//!
//! One [`PlayerSession`] holds everything the original implementation kept
//! in global mutable state: the self-asserted username, the currently
//! adopted round, the set of rounds already played, and the one-shot
//! submission flag. The lifecycle is tied to a player joining and lasts
//! for the process lifetime; the replay memory is deliberately not
//! persisted across restarts, so the authoritative replay guard has to
//! live server-side eventually.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::{constants, round::Round};

/// Errors from session creation
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Error {
    /// The username was empty after trimming
    #[error("username must not be empty")]
    EmptyUsername,
    /// The username exceeds the allowed length
    #[error("username is too long")]
    UsernameTooLong,
}

/// Process-local state for a single player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSession {
    username: String,
    /// The round the player is currently attached to, if any
    pub current_round: Option<Round>,
    played_round_ids: HashSet<String>,
    submitted: bool,
}

impl PlayerSession {
    /// Creates a session for a player joining with a self-asserted name
    ///
    /// The name is trimmed; an empty or oversized result is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyUsername`] or [`Error::UsernameTooLong`].
    pub fn join(username: &str) -> Result<Self, Error> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::EmptyUsername);
        }
        if username.len() > constants::session::MAX_USERNAME_LENGTH {
            return Err(Error::UsernameTooLong);
        }
        Ok(Self {
            username: username.to_owned(),
            current_round: None,
            played_round_ids: HashSet::new(),
            submitted: false,
        })
    }

    /// The player's name
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether this round id has already been played in this session
    pub fn has_played(&self, round_id: &str) -> bool {
        self.played_round_ids.contains(round_id)
    }

    /// Adopts a round for play, re-arming the submission guard
    pub fn begin_round(&mut self, round: Round) {
        self.current_round = Some(round);
        self.submitted = false;
    }

    /// Adopts a round as context only, leaving the submission guard alone
    ///
    /// Used for expired and already-played rounds, where adopting must not
    /// re-open the submission window.
    pub fn adopt_round(&mut self, round: Round) {
        self.current_round = Some(round);
    }

    /// Detaches from the current round
    pub fn clear_round(&mut self) {
        self.current_round = None;
    }

    /// Whether the current round has been submitted
    pub fn submitted(&self) -> bool {
        self.submitted
    }

    /// Arms the submission guard for the current round
    ///
    /// Returns `true` exactly once per adopted round; on success the round
    /// id is recorded in the replay memory. Returns `false` when already
    /// submitted or when no round is adopted.
    pub fn try_mark_submitted(&mut self) -> bool {
        if self.submitted {
            return false;
        }
        let Some(round) = &self.current_round else {
            return false;
        };
        self.submitted = true;
        self.played_round_ids.insert(round.id.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(id: &str) -> Round {
        Round {
            id: id.to_owned(),
            test_id: "t1".to_owned(),
            start_time: 0,
            duration: 10,
        }
    }

    #[test]
    fn test_join_trims_username() {
        let session = PlayerSession::join("  Ana  ").unwrap();
        assert_eq!(session.username(), "Ana");
    }

    #[test]
    fn test_join_rejects_blank_and_oversized() {
        assert_eq!(PlayerSession::join("   "), Err(Error::EmptyUsername));
        let long = "x".repeat(constants::session::MAX_USERNAME_LENGTH + 1);
        assert_eq!(PlayerSession::join(&long), Err(Error::UsernameTooLong));
    }

    #[test]
    fn test_submission_guard_fires_once_per_round() {
        let mut session = PlayerSession::join("Ana").unwrap();
        assert!(!session.try_mark_submitted());

        session.begin_round(round("r1"));
        assert!(session.try_mark_submitted());
        assert!(session.submitted());
        assert!(!session.try_mark_submitted());
        assert!(session.has_played("r1"));

        // A new round re-arms the guard; the replay memory persists.
        session.begin_round(round("r2"));
        assert!(!session.submitted());
        assert!(session.has_played("r1"));
        assert!(session.try_mark_submitted());
    }

    #[test]
    fn test_adopt_round_keeps_guard_closed() {
        let mut session = PlayerSession::join("Ana").unwrap();
        session.begin_round(round("r1"));
        assert!(session.try_mark_submitted());

        session.adopt_round(round("r1"));
        assert!(session.submitted());
        assert!(!session.try_mark_submitted());
    }
}
