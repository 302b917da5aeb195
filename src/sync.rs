//! Round synchronizer
//!
//! The [`Synchronizer`] is the state machine that keeps one player's view in
//! lockstep with the teacher-published round signal. It owns the session,
//! the adopted test and answer sheet, the countdown, and the leaderboard
//! views, and reacts to exactly three kinds of input from the host loop:
//! signal deliveries ([`Synchronizer::handle_signal`]), clock ticks
//! ([`Synchronizer::handle_tick`]), and player actions
//! ([`Synchronizer::record_answer`], [`Synchronizer::submit`]).
//!
//! Everything runs on the host's single thread. Signal deliveries are
//! at-least-once and idempotent: redelivering the current round neither
//! restarts the countdown nor re-renders the test nor re-opens submission.
//! Every failure is local: a malformed round is "no round", missing content
//! is skipped and retried on the next delivery, and a failed result write
//! is logged and dropped.

use crate::{
    countdown::{Countdown, TickOutcome},
    leaderboard::{GlobalBoard, RoundBoard},
    quiz::{Answer, AnswerSheet, Test, TestBank},
    render::{RenderCommand, Screen, Surface, WaitingNotice},
    round::RawRound,
    session::{self, PlayerSession},
    store::{ContentStore, ResultStore, ScoreEvent},
};

/// Per-player state machine driving screens, countdown, grading,
/// submission, and leaderboards from the round signal
pub struct Synchronizer {
    session: PlayerSession,
    bank: Option<TestBank>,
    current_test: Option<Test>,
    sheet: Option<AnswerSheet>,
    countdown: Option<Countdown>,
    round_board: Option<RoundBoard>,
    global_board: GlobalBoard,
    screen: Screen,
}

impl Synchronizer {
    /// Joins a player, showing the waiting screen and the global standings
    ///
    /// # Errors
    ///
    /// Returns a [`session::Error`] when the username is unusable.
    pub fn join<S: Surface, R: ResultStore>(
        username: &str,
        surface: &S,
        store: &R,
    ) -> Result<Self, session::Error> {
        let session = PlayerSession::join(username)?;
        tracing::info!(username = %session.username(), "player joined");

        let global_board = GlobalBoard::subscribe(store);
        surface.render(Screen::Waiting.into());
        surface.render(WaitingNotice::default().into());
        surface.render(RenderCommand::GlobalRows(global_board.rows().to_vec()));

        Ok(Self {
            session,
            bank: None,
            current_test: None,
            sheet: None,
            countdown: None,
            round_board: None,
            global_board,
            screen: Screen::Waiting,
        })
    }

    /// The currently visible screen
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// The player session
    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    /// Reacts to one delivery of the round signal
    ///
    /// Deliveries are at-least-once; redelivering the unchanged current
    /// round is a no-op. A malformed or absent value detaches from the
    /// round. A round whose content is not in the bank is ignored and
    /// retried on the next delivery.
    pub fn handle_signal<S: Surface, C: ContentStore, R: ResultStore>(
        &mut self,
        raw: Option<RawRound>,
        now_ms: i64,
        surface: &S,
        content: &C,
        store: &R,
    ) {
        let Some(round) = raw.and_then(RawRound::normalize) else {
            self.drop_round(surface);
            return;
        };

        // The bank is loaded lazily on the first real round and kept for
        // the process lifetime.
        if self.bank.is_none() {
            match content.load() {
                Ok(tests) => self.bank = Some(TestBank::new(tests)),
                Err(error) => {
                    tracing::warn!(%error, "content bank load failed, will retry");
                    return;
                }
            }
        }
        let Some(test) = self
            .bank
            .as_ref()
            .and_then(|bank| bank.get(&round.test_id))
            .cloned()
        else {
            // Content may still be propagating; leave the view as it is.
            tracing::debug!(round_id = %round.id, test_id = %round.test_id, "round references unknown content");
            return;
        };

        if round.is_expired(now_ms) {
            tracing::debug!(round_id = %round.id, "round arrived expired");
            self.session.adopt_round(round);
            self.countdown = None;
            self.current_test = None;
            self.sheet = None;
            self.round_board = None;
            self.screen = Screen::Waiting;
            surface.render(Screen::Waiting.into());
            surface.render(WaitingNotice::round_ended().into());
            return;
        }

        if self.session.has_played(&round.id) {
            let round_id = round.id.clone();
            self.session.adopt_round(round);
            self.countdown = None;
            self.current_test = None;
            self.sheet = None;
            self.screen = Screen::Results;
            surface.render(Screen::Results.into());
            surface.render(RenderCommand::ReplayLocked {
                detail: format!(
                    "{}, you already played this round.",
                    self.session.username()
                ),
            });
            self.attach_round_board(&round_id, surface, store);
            return;
        }

        // Idempotent redelivery of the live round: nothing changes.
        if self.screen == Screen::Game
            && !self.session.submitted()
            && self.session.current_round.as_ref() == Some(&round)
        {
            return;
        }

        tracing::info!(round_id = %round.id, test_id = %round.test_id, "adopting round");
        let round_id = round.id.clone();
        self.session.begin_round(round.clone());
        self.sheet = Some(test.blank_sheet());
        self.screen = Screen::Game;
        surface.render(Screen::Game.into());
        surface.render(RenderCommand::RenderTest(test.clone()));
        surface.render(RenderCommand::Progress {
            answered: 0,
            total: test.total(),
        });
        self.current_test = Some(test);
        self.attach_round_board(&round_id, surface, store);
        self.countdown = Some(Countdown::for_round(&round));
        self.handle_tick(now_ms, surface, store);
    }

    /// Detaches from the current round
    ///
    /// Results stay visible; any other screen falls back to waiting.
    fn drop_round<S: Surface>(&mut self, surface: &S) {
        self.countdown = None;
        if self.screen == Screen::Results {
            return;
        }
        self.session.clear_round();
        self.current_test = None;
        self.sheet = None;
        self.round_board = None;
        self.screen = Screen::Waiting;
        surface.render(Screen::Waiting.into());
        surface.render(WaitingNotice::default().into());
    }

    /// Records one answer action while the round is live
    ///
    /// Ignored outside the game screen or after submission.
    pub fn record_answer<S: Surface>(&mut self, answer: Answer, surface: &S) {
        if self.screen != Screen::Game || self.session.submitted() {
            return;
        }
        let Some(sheet) = &mut self.sheet else {
            return;
        };
        sheet.record(answer);
        surface.render(RenderCommand::Progress {
            answered: sheet.answered(),
            total: sheet.len(),
        });
    }

    /// Advances the countdown to `now_ms`
    ///
    /// On expiry the sheet is auto-submitted as-is; expiry is observed at
    /// most once per countdown.
    pub fn handle_tick<S: Surface, R: ResultStore>(
        &mut self,
        now_ms: i64,
        surface: &S,
        store: &R,
    ) {
        let Some(countdown) = &mut self.countdown else {
            return;
        };
        match countdown.tick(now_ms) {
            TickOutcome::Running(tick) => surface.render(tick.into()),
            TickOutcome::Expired => {
                self.countdown = None;
                surface.render(RenderCommand::CountdownExpired);
                self.submit_internal(now_ms, surface, store);
            }
            TickOutcome::AlreadyExpired => (),
        }
    }

    /// Submits the current sheet on the player's request
    pub fn submit<S: Surface, R: ResultStore>(&mut self, now_ms: i64, surface: &S, store: &R) {
        self.submit_internal(now_ms, surface, store);
    }

    fn submit_internal<S: Surface, R: ResultStore>(
        &mut self,
        now_ms: i64,
        surface: &S,
        store: &R,
    ) {
        let Some(round) = self.session.current_round.clone() else {
            return;
        };
        let (Some(test), Some(sheet)) = (&self.current_test, &self.sheet) else {
            return;
        };
        if !self.session.try_mark_submitted() {
            tracing::debug!(round_id = %round.id, "submission already recorded");
            return;
        }
        self.countdown = None;

        let grade = test.grade(sheet);
        let event = ScoreEvent::record(
            self.session.username(),
            &round,
            grade.score,
            grade.total,
            now_ms,
        );
        // Optimistic: the guard stays armed even when the write is lost.
        if let Err(error) = store.append(event) {
            tracing::warn!(%error, round_id = %round.id, "failed to record result");
        }

        self.screen = Screen::Results;
        surface.render(Screen::Results.into());
        surface.render(RenderCommand::ScoreSummary {
            score: grade.score,
            total: grade.total,
            percent: grade.percent(),
            detail: format!(
                "{}: {} out of {} correct",
                self.session.username(),
                grade.score,
                grade.total
            ),
        });
        surface.render(RenderCommand::RenderReview(grade.review));
        self.pump(surface, store);
    }

    /// Drains leaderboard notifications, re-rendering changed rows
    pub fn pump<S: Surface, R: ResultStore>(&mut self, surface: &S, store: &R) {
        if let Some(board) = &mut self.round_board {
            if board.pump(store) {
                surface.render(RenderCommand::RoundRows(board.rows()));
            }
        }
        if self.global_board.pump(store) {
            surface.render(RenderCommand::GlobalRows(self.global_board.rows().to_vec()));
        }
    }

    /// Returns to the waiting screen, keeping the session's replay memory
    pub fn reset<S: Surface>(&mut self, surface: &S) {
        self.countdown = None;
        self.session.clear_round();
        self.current_test = None;
        self.sheet = None;
        self.round_board = None;
        self.screen = Screen::Waiting;
        surface.render(Screen::Waiting.into());
        surface.render(WaitingNotice::default().into());
    }

    /// Replaces the round leaderboard listener, old one detached first
    fn attach_round_board<S: Surface, R: ResultStore>(
        &mut self,
        round_id: &str,
        surface: &S,
        store: &R,
    ) {
        self.round_board = None;
        let board = RoundBoard::subscribe(store, round_id);
        surface.render(RenderCommand::RoundRows(board.rows()));
        self.round_board = Some(board);
    }
}
