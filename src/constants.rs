//! Configuration constants for the Quizmaster game
//!
//! Limits and scoring parameters are grouped by the part of the game
//! they govern.

/// Single-player quiz configuration
pub mod quiz {
    use std::time::Duration;

    /// Time a player has to answer any question
    pub const TIME_LIMIT: Duration = Duration::from_secs(30);
    /// Maximum number of questions drawn for one single-player game
    pub const MAX_QUESTIONS: usize = 40;
    /// Lives in the regular single-player mode
    pub const LIVES: u8 = 3;
    /// Lives in hardcore mode
    pub const HARDCORE_LIVES: u8 = 1;
    /// Seconds left at which the countdown turns to a warning
    pub const WARNING_SECONDS: u64 = 10;
    /// Seconds left at which the countdown turns to danger
    pub const DANGER_SECONDS: u64 = 5;
}

/// Point computation parameters
pub mod scoring {
    /// Points for any correct answer
    pub const BASE_POINTS: u64 = 100;
    /// Extra points per difficulty level above the easiest
    pub const DIFFICULTY_BONUS: u64 = 50;
    /// Extra points per second left on the clock
    pub const SPEED_BONUS_PER_SECOND: f64 = 2.;
    /// Streak length from which the streak bonus applies
    pub const STREAK_THRESHOLD: u32 = 3;
    /// Extra points per answer in the current streak
    pub const STREAK_BONUS: u64 = 10;
    /// Multiplier applied to every score in hardcore mode
    pub const HARDCORE_MULTIPLIER: u64 = 2;
}

/// Multiplayer room configuration
pub mod room {
    /// Length of a room code
    pub const CODE_LENGTH: usize = 6;
    /// Default room capacity
    pub const DEFAULT_MAX_PLAYERS: usize = 4;
    /// Smallest room capacity that can be requested
    pub const MIN_PLAYERS: usize = 2;
    /// Largest room capacity that can be requested
    pub const MAX_PLAYERS: usize = 12;
    /// Default number of questions in a room game
    pub const DEFAULT_QUESTIONS_COUNT: usize = 20;
    /// Smallest number of questions that can be requested
    pub const MIN_QUESTIONS_COUNT: usize = 1;
    /// Largest number of questions that can be requested
    pub const MAX_QUESTIONS_COUNT: usize = 50;
}

/// Question content limits
pub mod question {
    /// Minimum number of choices of a question
    pub const MIN_CHOICES: usize = 2;
    /// Maximum number of choices of a question
    pub const MAX_CHOICES: usize = 8;
    /// Maximum length of a question, choice or explanation text
    pub const MAX_TEXT_LENGTH: usize = 500;
}

/// Player identity configuration
pub mod player {
    /// Maximum length of a player name
    pub const MAX_NAME_LENGTH: usize = 30;
    /// Name used when none was stored
    pub const DEFAULT_NAME: &str = "Anonymous";
    /// Avatar used when none was chosen
    pub const DEFAULT_AVATAR: &str = "😀";
}

/// Room chat configuration
pub mod chat {
    /// Maximum length of a chat message
    pub const MAX_MESSAGE_LENGTH: usize = 500;
    /// Author of the lines generated by the client itself
    pub const SYSTEM_AUTHOR: &str = "System";
}

/// Score history configuration
pub mod history {
    /// Number of entries in the best scores ranking
    pub const TOP_LIMIT: usize = 10;
    /// Number of most recent games in the progression series
    pub const PROGRESSION_LIMIT: usize = 20;
}
