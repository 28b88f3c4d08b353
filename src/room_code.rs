//! Room code parsing and formatting
//!
//! Rooms are identified by a short code that players read out to each
//! other. Codes are six characters drawn from uppercase ASCII letters and
//! digits; anything typed by a player is trimmed and upper-cased first.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::constants::room::CODE_LENGTH;

/// A multiplayer room identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomCode([u8; CODE_LENGTH]);

/// Errors that can occur when parsing a room code
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The code does not have exactly six characters
    #[error("room code must have {CODE_LENGTH} characters")]
    InvalidLength,
    /// The code contains something other than letters and digits
    #[error("room code may only contain letters and digits")]
    InvalidCharacter,
}

impl RoomCode {
    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        // only ASCII alphanumerics are ever stored
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomCode {
    type Err = Error;

    /// Parses a room code as typed by a player
    ///
    /// # Errors
    ///
    /// * `Error::InvalidLength` - the trimmed input is not six characters long
    /// * `Error::InvalidCharacter` - the input contains non-alphanumeric characters
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.chars().count() != CODE_LENGTH {
            return Err(Error::InvalidLength);
        }

        let mut code = [0; CODE_LENGTH];
        for (slot, c) in code.iter_mut().zip(s.chars()) {
            if !c.is_ascii_alphanumeric() {
                return Err(Error::InvalidCharacter);
            }
            *slot = c.to_ascii_uppercase() as u8;
        }

        Ok(Self(code))
    }
}

impl Serialize for RoomCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RoomCode {
    fn deserialize<D>(deserializer: D) -> Result<RoomCode, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RoomCode::from_str(&s).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}
