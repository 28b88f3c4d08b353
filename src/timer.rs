//! Per-question countdown
//!
//! The timer only records instants; whoever owns the clock schedules the
//! timeout alarm. Every query comes in an `_at` flavour taking the current
//! time explicitly, and a convenience flavour reading the system clock.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::SystemTime;

use crate::constants::quiz::{DANGER_SECONDS, TIME_LIMIT, WARNING_SECONDS};

/// How close a countdown is to running out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    /// More than ten seconds left
    Normal,
    /// Ten seconds or less left
    Warning,
    /// Five seconds or less left
    Danger,
}

/// A countdown for answering a single question
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionTimer {
    /// Total time allowed
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    limit: Duration,
    /// When the countdown started
    started_at: Option<SystemTime>,
    /// When the countdown was stopped, freezing the elapsed time
    stopped_at: Option<SystemTime>,
}

impl Default for QuestionTimer {
    fn default() -> Self {
        Self::new(TIME_LIMIT)
    }
}

impl QuestionTimer {
    /// Creates a countdown that has not started yet
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started_at: None,
            stopped_at: None,
        }
    }

    /// Returns the total time allowed
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Restarts the countdown at `now`
    pub fn start_at(&mut self, now: SystemTime) {
        self.started_at = Some(now);
        self.stopped_at = None;
    }

    /// Restarts the countdown now
    pub fn start(&mut self) {
        self.start_at(SystemTime::now());
    }

    /// Stops the countdown at `now`, keeping the elapsed time
    ///
    /// Stopping twice keeps the first stop.
    pub fn stop_at(&mut self, now: SystemTime) {
        if self.started_at.is_some() && self.stopped_at.is_none() {
            self.stopped_at = Some(now);
        }
    }

    /// Stops the countdown now
    pub fn stop(&mut self) {
        self.stop_at(SystemTime::now());
    }

    /// Stops the countdown as if the whole time had elapsed
    pub fn expire(&mut self) {
        if self.stopped_at.is_none() {
            self.stopped_at = self.started_at.map(|started_at| started_at + self.limit);
        }
    }

    /// Returns whether the countdown has started and not been stopped
    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.stopped_at.is_none()
    }

    /// Returns the time elapsed since the start, as seen at `now`
    ///
    /// A countdown that never started has no elapsed time, and a clock
    /// going backwards reads as no elapsed time either.
    pub fn elapsed_at(&self, now: SystemTime) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        self.stopped_at
            .unwrap_or(now)
            .duration_since(started_at)
            .unwrap_or_default()
    }

    /// Returns the time elapsed since the start
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(SystemTime::now())
    }

    /// Returns the time left, as seen at `now`
    pub fn remaining_at(&self, now: SystemTime) -> Duration {
        self.limit.saturating_sub(self.elapsed_at(now))
    }

    /// Returns the time left
    pub fn remaining(&self) -> Duration {
        self.remaining_at(SystemTime::now())
    }

    /// Returns the whole seconds left as a countdown shows them
    ///
    /// The count drops by one each time a full second has elapsed.
    pub fn seconds_left_at(&self, now: SystemTime) -> u64 {
        self.limit
            .as_secs()
            .saturating_sub(self.elapsed_at(now).as_secs())
    }

    /// Returns the whole seconds elapsed, capped at the limit
    pub fn seconds_taken_at(&self, now: SystemTime) -> u64 {
        self.elapsed_at(now).as_secs().min(self.limit.as_secs())
    }

    /// Returns whether the time is up at `now`
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.seconds_left_at(now) == 0
    }

    /// Returns the fraction of the time left, between 0 and 1
    pub fn remaining_fraction_at(&self, now: SystemTime) -> f64 {
        if self.limit.is_zero() {
            return 0.;
        }
        self.seconds_left_at(now) as f64 / self.limit.as_secs_f64()
    }

    /// Returns how close the countdown is to running out at `now`
    pub fn urgency_at(&self, now: SystemTime) -> Urgency {
        match self.seconds_left_at(now) {
            s if s <= DANGER_SECONDS => Urgency::Danger,
            s if s <= WARNING_SECONDS => Urgency::Warning,
            _ => Urgency::Normal,
        }
    }
}
