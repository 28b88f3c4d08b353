//! Events exchanged with the room server
//!
//! Every message is a JSON object carrying the event name under `event` and
//! its payload under `data`, with the field names the server uses. The
//! server owns the rooms; these types only describe what crosses the wire.

use std::{collections::HashMap, fmt::Display};

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    constants::player::DEFAULT_AVATAR, question::QuestionPrompt, room_code::RoomCode,
};

/// Connection identifier the server assigns to every client
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sid(pub String);

impl Display for Sid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Sid {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// A player as tracked by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Connection of the player
    pub sid: Sid,
    /// Display name
    pub name: String,
    /// Points accumulated in the current game
    #[serde(default)]
    pub score: u64,
    /// Whether the player is ready to start
    #[serde(default)]
    pub ready: bool,
    /// Emoji shown next to the name
    #[serde(default = "default_avatar")]
    pub avatar: String,
}

fn default_avatar() -> String {
    DEFAULT_AVATAR.to_owned()
}

/// Lifecycle of a room
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    /// Gathering players in the lobby
    #[default]
    Waiting,
    /// Questions are being asked
    Playing,
    /// Final results are out
    Finished,
}

/// The server's view of a room when it is created or joined
///
/// Fields the client has no use for, such as the question list, are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    /// Code players use to join
    pub code: RoomCode,
    /// Connection of the host
    pub host_sid: Sid,
    /// Question category
    #[serde(default)]
    pub category: String,
    /// Room capacity
    #[serde(default)]
    pub max_players: usize,
    /// Number of questions in the game
    #[serde(default)]
    pub questions_count: usize,
    /// Players currently in the room, in joining order
    #[serde(default)]
    pub players: Vec<Player>,
    /// Lifecycle of the room
    #[serde(default)]
    pub status: RoomStatus,
    /// Index of the question being asked
    #[serde(default)]
    pub current_question: usize,
}

/// How a player fared on the last question
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Whether the chosen answer was correct
    pub is_correct: bool,
    /// Seconds the player took to answer
    pub time_taken: f64,
}

/// Events a client emits to the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Opens a new room hosted by the sender
    CreateRoom {
        /// Name of the host
        player_name: String,
        /// Avatar of the host
        avatar: String,
        /// Question category
        category: String,
        /// Number of questions in the game
        questions_count: usize,
        /// Room capacity
        max_players: usize,
    },
    /// Joins an existing room
    JoinRoom {
        /// Room to join
        room_code: RoomCode,
        /// Name of the player
        player_name: String,
        /// Avatar of the player
        avatar: String,
    },
    /// Leaves the room
    LeaveRoom {
        /// Room to leave
        room_code: RoomCode,
    },
    /// Marks the sender as ready
    PlayerReady {
        /// Room of the player
        room_code: RoomCode,
    },
    /// Starts the game, host only
    StartGame {
        /// Room to start
        room_code: RoomCode,
    },
    /// Answers the current question
    SubmitAnswer {
        /// Room of the player
        room_code: RoomCode,
        /// Chosen answer, or -1 when time ran out
        answer: i64,
        /// Whole seconds taken to answer
        time_taken: u64,
    },
    /// Sends a chat line to the room
    ChatMessage {
        /// Room of the player
        room_code: RoomCode,
        /// The chat line
        message: String,
    },
}

/// Events the server sends to a client
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The connection is established
    Connected {
        /// Identifier of this client
        sid: Sid,
    },
    /// The room requested by this client was created
    RoomCreated {
        /// Code of the new room
        room_code: RoomCode,
        /// The new room
        room: RoomSnapshot,
    },
    /// This client joined a room
    RoomJoined {
        /// Code of the room
        room_code: RoomCode,
        /// The joined room
        room: RoomSnapshot,
    },
    /// Someone joined the room
    PlayerJoined {
        /// Players in the room
        players: Vec<Player>,
        /// Number of players in the room
        players_count: usize,
    },
    /// Someone left the room
    PlayerLeft {
        /// Connection of the departed player
        sid: Sid,
        /// Number of players left
        players_count: usize,
        /// Players left, when the server provides them
        #[serde(default)]
        players: Option<Vec<Player>>,
    },
    /// Someone changed their ready flag
    PlayerReadyUpdate {
        /// Players in the room
        players: Vec<Player>,
    },
    /// Every player is ready and there are enough of them
    AllPlayersReady {},
    /// The host started the game
    GameStarted {
        /// Number of questions in the game
        total_questions: usize,
    },
    /// A question is open for answers
    NewQuestion {
        /// Position of the question, starting at 1
        question_number: usize,
        /// Number of questions in the game
        total_questions: usize,
        /// The question without its solution
        question: QuestionPrompt,
    },
    /// Someone answered the current question
    PlayerAnswered {
        /// Connection of the player who answered
        sid: Sid,
        /// Number of answers received so far
        answered_count: usize,
        /// Number of players expected to answer
        total_players: usize,
    },
    /// Everyone answered and the solution is revealed
    QuestionResults {
        /// Index of the correct choice
        correct_answer: usize,
        /// Explanation of the solution
        #[serde(default)]
        explanation: String,
        /// Players with their updated scores
        players: Vec<Player>,
        /// Outcome per player
        #[serde(default)]
        answers: HashMap<Sid, AnswerResult>,
    },
    /// The last question was answered
    GameEnded {
        /// Players sorted by score
        players: Vec<Player>,
    },
    /// A chat line was posted to the room
    ChatMessage {
        /// Author of the line
        player_name: String,
        /// The chat line
        message: String,
        /// When the server relayed it, in ISO 8601
        #[serde(default)]
        timestamp: String,
    },
    /// The host left and someone else took over
    NewHost {
        /// Connection of the new host
        host_sid: Sid,
    },
    /// The server rejected a request
    Error {
        /// Human readable reason
        message: String,
    },
}

/// Errors that can occur when decoding events
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The message is not a known event with a valid payload
    #[error("malformed event: {0}")]
    Malformed(String),
}

impl ClientEvent {
    /// Returns the event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "create_room",
            Self::JoinRoom { .. } => "join_room",
            Self::LeaveRoom { .. } => "leave_room",
            Self::PlayerReady { .. } => "player_ready",
            Self::StartGame { .. } => "start_game",
            Self::SubmitAnswer { .. } => "submit_answer",
            Self::ChatMessage { .. } => "chat_message",
        }
    }

    /// Converts the event to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

impl ServerEvent {
    /// Parses an event received from the server
    ///
    /// # Errors
    ///
    /// Returns `Error::Malformed` if the message is not valid JSON, names
    /// an unknown event, or carries an unexpected payload.
    pub fn from_message(message: &str) -> Result<Self, Error> {
        serde_json::from_str(message).map_err(|e| Error::Malformed(e.to_string()))
    }
}
