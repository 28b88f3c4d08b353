//! Game configuration chosen by the player
//!
//! Single-player preferences are persisted in [`Storage`] between pages,
//! while room settings travel with the `create_room` event.

use std::fmt::Display;

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::{self, player::DEFAULT_NAME},
    storage::{Storage, keys},
};

/// Single-player game mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Three lives, regular scoring
    #[default]
    Solo,
    /// One life, doubled scoring
    Hardcore,
}

impl GameMode {
    /// Returns the number of lives a game starts with
    pub fn lives(self) -> u8 {
        match self {
            Self::Solo => constants::quiz::LIVES,
            Self::Hardcore => constants::quiz::HARDCORE_LIVES,
        }
    }

    /// Returns the multiplier applied to every score
    pub fn multiplier(self) -> u64 {
        match self {
            Self::Solo => 1,
            Self::Hardcore => constants::scoring::HARDCORE_MULTIPLIER,
        }
    }

    /// Returns the identifier used in storage and records
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Hardcore => "hardcore",
        }
    }

    /// Parses a stored mode, treating anything unknown as [`GameMode::Solo`]
    pub fn from_stored(value: &str) -> Self {
        match value {
            "hardcore" => Self::Hardcore,
            _ => Self::Solo,
        }
    }
}

impl Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when loading the configuration
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No category was selected before starting a game
    #[error("no category selected")]
    MissingCategory,
}

/// Preferences of a single-player game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Selected mode
    pub mode: GameMode,
    /// Selected question category
    pub category: String,
    /// Name recorded with the score
    pub player_name: String,
}

impl Settings {
    /// Creates settings for a regular game
    pub fn new(category: &str, player_name: &str) -> Self {
        Self {
            mode: GameMode::Solo,
            category: category.to_owned(),
            player_name: player_name.to_owned(),
        }
    }

    /// Loads the stored preferences
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingCategory` if no category was stored; the
    /// player needs to go back and pick one.
    pub fn load<S: Storage>(storage: &S) -> Result<Self, Error> {
        let category = storage
            .get(keys::CATEGORY)
            .filter(|c| !c.trim().is_empty())
            .ok_or(Error::MissingCategory)?;

        Ok(Self {
            mode: storage
                .get(keys::MODE)
                .map_or(GameMode::Solo, |m| GameMode::from_stored(&m)),
            category,
            player_name: storage
                .get(keys::PLAYER_NAME)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NAME.to_owned()),
        })
    }

    /// Stores the preferences
    pub fn store<S: Storage>(&self, storage: &mut S) {
        storage.set(keys::MODE, self.mode.as_str().to_owned());
        storage.set(keys::CATEGORY, self.category.clone());
        storage.set(keys::PLAYER_NAME, self.player_name.clone());
    }
}

/// Settings of a multiplayer room, chosen by its creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RoomSettings {
    /// Question category
    #[garde(length(min = 1))]
    pub category: String,
    /// Number of questions in the game
    #[garde(range(
        min = constants::room::MIN_QUESTIONS_COUNT,
        max = constants::room::MAX_QUESTIONS_COUNT
    ))]
    pub questions_count: usize,
    /// Room capacity
    #[garde(range(min = constants::room::MIN_PLAYERS, max = constants::room::MAX_PLAYERS))]
    pub max_players: usize,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            category: "maths".to_owned(),
            questions_count: constants::room::DEFAULT_QUESTIONS_COUNT,
            max_players: constants::room::DEFAULT_MAX_PLAYERS,
        }
    }
}
