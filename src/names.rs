//! Player name validation
//!
//! Names are typed freely and shown to everyone in a room, so they are
//! trimmed and run through the profanity filter before use.

use rustrict::CensorStr;
use serde::Serialize;
use thiserror::Error;

use crate::constants::player::MAX_NAME_LENGTH;

/// Reasons a player name is refused
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Nothing but whitespace was typed
    #[error("please enter your name")]
    Empty,
    /// The profanity filter flagged the name
    #[error("this name is not allowed")]
    Sinful,
    /// More than thirty characters were typed
    #[error("names are limited to {MAX_NAME_LENGTH} characters")]
    TooLong,
}

/// Validates a player name and returns its cleaned form
///
/// # Errors
///
/// * `Error::TooLong` - the trimmed name has more than 30 characters
/// * `Error::Empty` - the name is empty after trimming whitespace
/// * `Error::Sinful` - the name contains inappropriate content
pub fn validate(name: &str) -> Result<String, Error> {
    let name = rustrict::trim_whitespace(name);
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::TooLong);
    }
    if name.is_empty() {
        return Err(Error::Empty);
    }
    if name.is_inappropriate() {
        return Err(Error::Sinful);
    }
    Ok(name.to_owned())
}
