//! Key-value persistence of preferences and score history
//!
//! Values are plain strings (JSON for structured data), the shape browser
//! local storage offers.

use std::collections::HashMap;

/// Keys under which the game persists its data
pub mod keys {
    /// Selected single-player mode (`solo` or `hardcore`)
    pub const MODE: &str = "quizMode";
    /// Selected question category
    pub const CATEGORY: &str = "quizCategory";
    /// Last player name used
    pub const PLAYER_NAME: &str = "playerName";
    /// JSON array of finished single-player games
    pub const SCORES: &str = "quizScores";
}

/// A string key-value store
pub trait Storage {
    /// Returns the value stored under `key`, if any
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: String);

    /// Removes the value stored under `key`
    fn remove(&mut self, key: &str);
}

/// In-memory storage, lost when dropped
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    /// Creates an empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.get(keys::PLAYER_NAME), None);

        storage.set(keys::PLAYER_NAME, "Rija".to_owned());
        assert_eq!(storage.get(keys::PLAYER_NAME).as_deref(), Some("Rija"));

        storage.set(keys::PLAYER_NAME, "Hery".to_owned());
        assert_eq!(storage.get(keys::PLAYER_NAME).as_deref(), Some("Hery"));

        storage.remove(keys::PLAYER_NAME);
        assert_eq!(storage.get(keys::PLAYER_NAME), None);
    }
}
