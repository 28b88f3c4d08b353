//! # Quizmaster Game Library
//!
//! This library provides the game logic behind the Quizmaster trivia front end.
//! It drives a single-player timed quiz, mirrors the state of a multiplayer
//! room hosted by an external server, and keeps the local score history with
//! its derived statistics.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
use derive_where::derive_where;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub mod constants;

pub mod history;
pub mod leaderboard;
pub mod multiplayer;
pub mod names;
pub mod protocol;
pub mod question;
pub mod room_code;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod solo;
pub mod storage;
pub mod timer;

/// Messages sent to resynchronize a presentation layer with the full state
///
/// A view that is (re)built from scratch, for instance after a page reload,
/// receives one of these instead of replaying every update.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum SyncMessage {
    /// Single-player quiz state
    Solo(solo::SyncMessage),
    /// Multiplayer room state
    Multiplayer(multiplayer::SyncMessage),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Messages describing an incremental change the presentation layer should render
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum UpdateMessage {
    /// Single-player quiz updates
    Solo(solo::UpdateMessage),
    /// Multiplayer room updates
    Multiplayer(multiplayer::UpdateMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Alarm messages for timed events
///
/// The caller owns the clock: whenever a controller asks for an alarm to be
/// scheduled, the caller must hand the same message back to the controller
/// once the requested duration has passed.
#[derive(Debug, Clone, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Single-player alarms
    Solo(solo::AlarmMessage),
    /// Multiplayer alarms
    Multiplayer(multiplayer::AlarmMessage),
}

/// The head of a longer list, remembering how long the list was
///
/// Rankings only show their first entries, such as the ten best games out
/// of the whole history, while still telling how many entries there are.
#[derive(Debug, Clone, Serialize)]
#[derive_where(Default)]
pub struct TruncatedVec<T> {
    exact_count: usize,
    items: Vec<T>,
}

impl<T> TruncatedVec<T> {
    /// Keeps the first `limit` entries of `list`, whose full length is
    /// `exact_count`
    pub fn new<I: Iterator<Item = T>>(list: I, limit: usize, exact_count: usize) -> Self {
        Self {
            exact_count,
            items: list.take(limit).collect_vec(),
        }
    }

    /// Keeps the first `limit` entries of `list`, counting it whole
    pub fn head_of(list: Vec<T>, limit: usize) -> Self {
        let exact_count = list.len();
        Self::new(list.into_iter(), limit, exact_count)
    }

    /// Converts every kept entry
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> TruncatedVec<U> {
        TruncatedVec {
            exact_count: self.exact_count,
            items: self.items.into_iter().map(f).collect_vec(),
        }
    }

    /// Returns the length of the full list
    pub fn exact_count(&self) -> usize {
        self.exact_count
    }

    /// Returns the kept entries
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns how many entries were left out
    pub fn hidden(&self) -> usize {
        self.exact_count.saturating_sub(self.items.len())
    }
}
