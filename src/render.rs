//! Rendering surface abstraction
//!
//! The synchronizer never touches a display directly. It emits
//! [`RenderCommand`]s to an abstract [`Surface`], which an embedding maps
//! onto whatever it has: a DOM, a terminal, or a test recorder. Commands
//! are fire-and-forget; a surface that drops them cannot corrupt the core
//! state machine.

use serde::Serialize;

use crate::{
    countdown::Tick,
    leaderboard::{GlobalRow, RoundRow},
    quiz::{ReviewItem, Test},
};

/// Top-level screens of the player view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    /// No playable round; the idle notice is shown
    Waiting,
    /// A round is live and the test is rendered
    Game,
    /// The player's outcome, review, and leaderboards
    Results,
}

/// The message pair shown on the waiting screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitingNotice {
    /// The heading line
    pub heading: String,
    /// The explanatory line beneath it
    pub sub: String,
}

impl Default for WaitingNotice {
    fn default() -> Self {
        Self {
            heading: "Waiting for the teacher…".to_owned(),
            sub: "The next round will appear here automatically.".to_owned(),
        }
    }
}

impl WaitingNotice {
    /// The notice shown when a round arrives already expired
    pub fn round_ended() -> Self {
        Self {
            heading: "Round ended!".to_owned(),
            sub: "Wait for the teacher to start the next round.".to_owned(),
        }
    }
}

/// One instruction to the display surface
#[derive(Debug, Clone, Serialize, derive_more::From)]
#[serde(rename_all = "camelCase", tag = "kind", content = "data")]
pub enum RenderCommand {
    /// Switch the visible screen
    #[from]
    ShowScreen(Screen),
    /// Replace the waiting screen message pair
    #[from]
    WaitingMessage(WaitingNotice),
    /// Render the test content for play
    RenderTest(Test),
    /// Update the answered-so-far progress indicator
    Progress {
        /// Items with a recorded answer
        answered: usize,
        /// Total gradable items
        total: usize,
    },
    /// Update the countdown display
    #[from]
    CountdownTick(Tick),
    /// The countdown reached zero
    CountdownExpired,
    /// Show the player's graded outcome
    ScoreSummary {
        /// Correct items
        score: u32,
        /// Gradable items
        total: u32,
        /// Rounded percentage
        percent: u32,
        /// Human-readable summary line
        detail: String,
    },
    /// The round was already played; submission is locked
    ReplayLocked {
        /// Human-readable notice
        detail: String,
    },
    /// Render the per-item review
    RenderReview(Vec<ReviewItem>),
    /// Replace the round leaderboard rows
    RoundRows(Vec<RoundRow>),
    /// Replace the global leaderboard rows
    GlobalRows(Vec<GlobalRow>),
}

impl RenderCommand {
    /// Serializes the command for a surface speaking JSON
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// A display the synchronizer renders onto
pub trait Surface {
    /// Applies one command to the display
    fn render(&self, command: RenderCommand);
}
