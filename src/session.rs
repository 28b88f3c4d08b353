//! Communication seams of the game controllers
//!
//! Controllers never talk to a screen, a socket or an HTTP endpoint
//! directly. They push presentation changes through a [`Tunnel`], emit
//! room events through a [`Channel`] and upload finished games through a
//! [`ScoreSink`], so any front end can plug in its own transport.

use super::{SyncMessage, UpdateMessage, history::ScoreRecord, protocol::ClientEvent};

/// Trait for sending messages to the presentation layer
pub trait Tunnel {
    /// Sends an incremental update to render
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_message(&self, message: &UpdateMessage);

    /// Sends a full state snapshot, replacing whatever was rendered before
    ///
    /// # Arguments
    ///
    /// * `state` - The synchronization message to send
    fn send_state(&self, state: &SyncMessage);
}

/// Trait for emitting events on the real-time room channel
///
/// Delivery is best effort: the room server owns the authoritative state
/// and answers with its own events.
pub trait Channel {
    /// Emits a client event to the room server
    fn emit(&self, event: &ClientEvent);
}

/// Errors reported by a [`ScoreSink`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("score upload failed: {0}")]
pub struct UploadError(pub String);

/// Trait for uploading finished games to a remote score service
pub trait ScoreSink {
    /// Uploads a score record
    ///
    /// # Errors
    ///
    /// Returns an `UploadError` if the remote service rejected the record
    /// or could not be reached.
    fn save_score(&self, record: &ScoreRecord) -> Result<(), UploadError>;
}
