//! Point computation for correct answers
//!
//! A correct answer earns a base amount, a bonus for harder questions, a
//! bonus for every second left on the clock and, from the third
//! consecutive correct answer on, a streak bonus. Hardcore games double
//! the total.

use std::time::Duration;

use serde::Serialize;

use crate::{
    constants::{
        quiz::TIME_LIMIT,
        scoring::{
            BASE_POINTS, DIFFICULTY_BONUS, SPEED_BONUS_PER_SECOND, STREAK_BONUS, STREAK_THRESHOLD,
        },
    },
    question::Difficulty,
};

/// Breakdown of the points earned by a correct answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Points {
    /// Points for answering correctly
    pub base: u64,
    /// Bonus for the difficulty of the question
    pub difficulty: u64,
    /// Bonus for answering quickly
    pub speed: u64,
    /// Bonus for the current streak
    pub streak: u64,
    /// Multiplier applied to the sum of the above
    pub multiplier: u64,
}

impl Points {
    /// Computes the points of a correct answer
    ///
    /// # Arguments
    ///
    /// * `difficulty` - Difficulty of the answered question
    /// * `response_time` - Time taken to answer
    /// * `streak` - Length of the streak, including this answer
    /// * `multiplier` - Game mode multiplier
    pub fn new(
        difficulty: Difficulty,
        response_time: Duration,
        streak: u32,
        multiplier: u64,
    ) -> Self {
        Self {
            base: BASE_POINTS,
            difficulty: (u64::from(difficulty.level()) - 1) * DIFFICULTY_BONUS,
            speed: speed_bonus(response_time),
            streak: if streak >= STREAK_THRESHOLD {
                u64::from(streak) * STREAK_BONUS
            } else {
                0
            },
            multiplier,
        }
    }

    /// Returns the points awarded
    pub fn total(&self) -> u64 {
        (self.base + self.difficulty + self.speed + self.streak) * self.multiplier
    }
}

/// Computes the bonus for the time left after `response_time`
///
/// Fractions of a point are dropped and answers given after the time
/// limit earn nothing.
pub fn speed_bonus(response_time: Duration) -> u64 {
    let left = TIME_LIMIT.as_secs_f64() - response_time.as_secs_f64();
    (left * SPEED_BONUS_PER_SECOND).floor().max(0.) as u64
}
