//! Configuration constants for the QuizArena core
//!
//! This module contains the limits and timing constants used throughout
//! the synchronization core to ensure data integrity and provide
//! consistent boundaries for the different components.

/// Countdown engine constants
pub mod countdown {
    /// Target interval between countdown ticks in milliseconds
    pub const TICK_INTERVAL_MS: u64 = 250;
    /// Remaining fraction below which the countdown is considered urgent
    pub const URGENT_FRACTION: f64 = 0.2;
}

/// Player session constants
pub mod session {
    /// Maximum length of a self-asserted username in characters
    pub const MAX_USERNAME_LENGTH: usize = 40;
}

/// Content bank constants
pub mod content {
    /// Maximum length of a test title in characters
    pub const MAX_TITLE_LENGTH: usize = 200;
    /// Maximum length of a question or statement in characters
    pub const MAX_QUESTION_LENGTH: usize = 500;
    /// Maximum length of a fill-in passage in characters
    pub const MAX_PASSAGE_LENGTH: usize = 2000;
    /// Maximum number of questions or statements in a single test
    pub const MAX_QUESTION_COUNT: usize = 100;
    /// Maximum number of blanks in a fill-in passage
    pub const MAX_BLANK_COUNT: usize = 50;
    /// Maximum number of selectable options per question or blank
    pub const MAX_OPTION_COUNT: usize = 8;
}
