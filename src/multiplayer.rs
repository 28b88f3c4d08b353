//! Client side of a multiplayer room
//!
//! Rooms live on the server. The client mirrors what the server reports,
//! turns player actions into [`ClientEvent`]s and tells the presentation
//! layer what changed. It never decides a score or a ranking by itself.
//!
//! A room goes through four screens: the menu where a room is created or
//! joined, the lobby where players get ready, the game where questions are
//! answered against a countdown, and the final results.

use std::time::Duration;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use web_time::SystemTime;

use crate::{
    constants::{
        chat::{MAX_MESSAGE_LENGTH, SYSTEM_AUTHOR},
        player::DEFAULT_AVATAR,
    },
    leaderboard::{self, PodiumPlace, Standing},
    names,
    protocol::{self, AnswerResult, ClientEvent, Player, RoomSnapshot, ServerEvent, Sid},
    question::QuestionPrompt,
    room_code::{self, RoomCode},
    session::{Channel, Tunnel},
    settings::RoomSettings,
    storage::{Storage, keys},
    timer::{QuestionTimer, Urgency},
};

/// Screen shown to the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    /// Creating or joining a room
    #[default]
    Menu,
    /// Waiting for players in a room
    Lobby,
    /// Answering questions
    Game,
    /// Final results
    Results,
}

/// A line of the room chat
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatLine {
    /// Who wrote the line
    pub author: String,
    /// The line itself
    pub message: String,
    /// When the server relayed it, absent for local notices
    pub timestamp: Option<String>,
    /// Whether the line is a notice rather than a player message
    pub is_system: bool,
}

impl ChatLine {
    fn system(message: String) -> Self {
        Self {
            author: SYSTEM_AUTHOR.to_owned(),
            message,
            timestamp: None,
            is_system: true,
        }
    }
}

/// Errors that can occur when acting in a room
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The player name was rejected
    #[error(transparent)]
    Name(#[from] names::Error),
    /// The room code was rejected
    #[error(transparent)]
    RoomCode(#[from] room_code::Error),
    /// The room settings are out of bounds
    #[error("invalid room settings: {0}")]
    Settings(String),
    /// The action needs a room
    #[error("not in a room")]
    NotInRoom,
    /// Only the host can do this
    #[error("only the host can start the game")]
    NotHost,
    /// The player is already marked as ready
    #[error("already ready")]
    AlreadyReady,
    /// No question is open for answers
    #[error("no question to answer")]
    NoQuestion,
    /// The current question was already answered
    #[error("already answered")]
    AlreadyAnswered,
    /// The answer does not point at a choice
    #[error("choice {0} does not exist")]
    InvalidChoice(usize),
    /// The chat line exceeds the maximum allowed length
    #[error("message is too long")]
    MessageTooLong,
}

/// Update messages sent to the presentation layer of a room
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// Another screen must be shown
    Screen(Screen),
    /// The players in the room changed
    Players(Vec<Player>),
    /// Every player is ready, the host can start
    AllPlayersReady,
    /// This player became the host
    HostPromoted,
    /// A question is open for answers
    Question {
        /// Position of the question, starting at 1
        question_number: usize,
        /// Number of questions in the game
        total_questions: usize,
        /// The question without its solution
        question: QuestionPrompt,
        /// Time allowed to answer
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        duration: Duration,
    },
    /// Someone answered the current question
    AnsweredCount {
        /// Number of answers received so far
        answered_count: usize,
        /// Number of players expected to answer
        total_players: usize,
    },
    /// The ranking changed
    Scoreboard(Vec<Standing>),
    /// The solution of the current question is revealed
    AnswerRevealed {
        /// Index of the correct choice
        correct_answer: usize,
        /// Explanation of the solution
        explanation: String,
        /// How this player fared, if they answered
        result: Option<AnswerResult>,
    },
    /// A chat line was added
    Chat(ChatLine),
    /// The game is over
    Results {
        /// First three players in display order
        podium: Vec<PodiumPlace>,
        /// Every player, ranked
        standings: Vec<Standing>,
        /// Whether this player won
        is_winner: bool,
    },
    /// The server rejected a request
    Error(String),
}

/// Alarm messages for timed events in a room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// The time to answer a question ran out
    QuestionTimeout {
        /// Position of the question the alarm was scheduled for
        question_number: usize,
    },
}

/// Synchronization messages describing the whole room view
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// Creating or joining a room
    Menu,
    /// Waiting for players
    Lobby {
        /// Code players use to join
        room_code: RoomCode,
        /// Whether this player is the host
        is_host: bool,
        /// Whether this player is ready
        ready: bool,
        /// Whether every player is ready
        all_ready: bool,
        /// Room capacity
        max_players: usize,
        /// Players in the room
        players: Vec<Player>,
        /// Chat history
        chat: Vec<ChatLine>,
    },
    /// Answering questions
    Game {
        /// Position of the question, starting at 1
        question_number: usize,
        /// Number of questions in the game
        total_questions: usize,
        /// The open question, if one was sent already
        question: Option<QuestionPrompt>,
        /// Time left to answer
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        remaining: Duration,
        /// Whether this player answered the current question
        has_answered: bool,
        /// Number of answers received so far
        answered_count: usize,
        /// Index of the correct choice, once revealed
        correct_answer: Option<usize>,
        /// Every player, ranked
        standings: Vec<Standing>,
        /// Chat history
        chat: Vec<ChatLine>,
    },
    /// Final results
    Results {
        /// First three players in display order
        podium: Vec<PodiumPlace>,
        /// Every player, ranked
        standings: Vec<Standing>,
        /// Whether this player won
        is_winner: bool,
        /// Chat history
        chat: Vec<ChatLine>,
    },
}

/// Returns the name saved by a previous visit, to prefill the name field
pub fn saved_name<S: Storage>(storage: &S) -> Option<String> {
    storage.get(keys::PLAYER_NAME).filter(|n| !n.trim().is_empty())
}

/// The client view of a multiplayer room
#[derive(Debug, Clone, Serialize)]
pub struct Client {
    sid: Option<Sid>,
    name: String,
    avatar: String,
    room_code: Option<RoomCode>,
    is_host: bool,
    max_players: usize,
    players: Vec<Player>,
    screen: Screen,
    ready: bool,
    all_ready: bool,
    prompt: Option<QuestionPrompt>,
    question_number: usize,
    total_questions: usize,
    timer: QuestionTimer,
    has_answered: bool,
    answered_count: usize,
    correct_answer: Option<usize>,
    last_result: Option<AnswerResult>,
    chat: Vec<ChatLine>,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            sid: None,
            name: String::new(),
            avatar: DEFAULT_AVATAR.to_owned(),
            room_code: None,
            is_host: false,
            max_players: 0,
            players: Vec::new(),
            screen: Screen::Menu,
            ready: false,
            all_ready: false,
            prompt: None,
            question_number: 0,
            total_questions: 0,
            timer: QuestionTimer::default(),
            has_answered: false,
            answered_count: 0,
            correct_answer: None,
            last_result: None,
            chat: Vec::new(),
        }
    }
}

impl Client {
    /// Creates a client showing the menu
    pub fn new() -> Self {
        Self::default()
    }

    fn identify<S: Storage>(
        &mut self,
        name: &str,
        avatar: &str,
        storage: &mut S,
    ) -> Result<(), Error> {
        let name = names::validate(name)?;
        storage.set(keys::PLAYER_NAME, name.clone());

        self.name = name;
        self.avatar = match avatar.trim() {
            "" => DEFAULT_AVATAR.to_owned(),
            avatar => avatar.to_owned(),
        };

        Ok(())
    }

    fn room_code(&self) -> Result<RoomCode, Error> {
        self.room_code.ok_or(Error::NotInRoom)
    }

    /// Asks the server for a new room hosted by this player
    ///
    /// The name is remembered in `storage` for the next visit.
    ///
    /// # Errors
    ///
    /// * `Error::Name` - the name was rejected
    /// * `Error::Settings` - the room settings are out of bounds
    pub fn create_room<S: Storage, C: Channel>(
        &mut self,
        name: &str,
        avatar: &str,
        settings: &RoomSettings,
        storage: &mut S,
        channel: &C,
    ) -> Result<(), Error> {
        settings
            .validate()
            .map_err(|report| Error::Settings(report.to_string()))?;
        self.identify(name, avatar, storage)?;

        channel.emit(&ClientEvent::CreateRoom {
            player_name: self.name.clone(),
            avatar: self.avatar.clone(),
            category: settings.category.clone(),
            questions_count: settings.questions_count,
            max_players: settings.max_players,
        });

        Ok(())
    }

    /// Asks the server to join the room with the code `code`
    ///
    /// # Errors
    ///
    /// * `Error::RoomCode` - the code is not six letters or digits
    /// * `Error::Name` - the name was rejected
    pub fn join_room<S: Storage, C: Channel>(
        &mut self,
        name: &str,
        code: &str,
        avatar: &str,
        storage: &mut S,
        channel: &C,
    ) -> Result<(), Error> {
        let room_code: RoomCode = code.parse()?;
        self.identify(name, avatar, storage)?;

        channel.emit(&ClientEvent::JoinRoom {
            room_code,
            player_name: self.name.clone(),
            avatar: self.avatar.clone(),
        });

        Ok(())
    }

    /// Leaves the room and goes back to the menu
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInRoom` outside of a room.
    pub fn leave_room<C: Channel, T: Tunnel>(
        &mut self,
        channel: &C,
        tunnel: &T,
    ) -> Result<(), Error> {
        let room_code = self.room_code()?;
        channel.emit(&ClientEvent::LeaveRoom { room_code });

        tracing::info!(%room_code, "left room");

        *self = Self {
            sid: self.sid.take(),
            name: std::mem::take(&mut self.name),
            avatar: std::mem::take(&mut self.avatar),
            ..Self::default()
        };
        tunnel.send_message(&UpdateMessage::Screen(Screen::Menu).into());

        Ok(())
    }

    /// Marks this player as ready
    ///
    /// # Errors
    ///
    /// * `Error::NotInRoom` - outside of a room
    /// * `Error::AlreadyReady` - the player is ready already
    pub fn set_ready<C: Channel>(&mut self, channel: &C) -> Result<(), Error> {
        let room_code = self.room_code()?;
        if self.ready {
            return Err(Error::AlreadyReady);
        }

        channel.emit(&ClientEvent::PlayerReady { room_code });
        self.ready = true;

        Ok(())
    }

    /// Asks the server to start the game
    ///
    /// # Errors
    ///
    /// * `Error::NotInRoom` - outside of a room
    /// * `Error::NotHost` - this player is not the host
    pub fn start_game<C: Channel>(&self, channel: &C) -> Result<(), Error> {
        let room_code = self.room_code()?;
        if !self.is_host {
            return Err(Error::NotHost);
        }

        channel.emit(&ClientEvent::StartGame { room_code });

        Ok(())
    }

    /// Answers the current question
    ///
    /// # Errors
    ///
    /// See [`Client::submit_answer_at`].
    pub fn submit_answer<C: Channel>(&mut self, choice: usize, channel: &C) -> Result<(), Error> {
        self.submit_answer_at(choice, SystemTime::now(), channel)
    }

    /// Answers the current question at `now`
    ///
    /// The time taken is reported in whole seconds. Once the countdown has
    /// run out the choice is dropped and an empty answer with the full time
    /// is sent instead, as the timeout alarm would.
    ///
    /// # Errors
    ///
    /// * `Error::NotInRoom` - outside of a room
    /// * `Error::NoQuestion` - no question is open
    /// * `Error::AlreadyAnswered` - the question was answered already
    /// * `Error::InvalidChoice` - `choice` is not one of the choices
    pub fn submit_answer_at<C: Channel>(
        &mut self,
        choice: usize,
        now: SystemTime,
        channel: &C,
    ) -> Result<(), Error> {
        self.room_code()?;
        let Some(prompt) = &self.prompt else {
            return Err(Error::NoQuestion);
        };
        if self.has_answered {
            return Err(Error::AlreadyAnswered);
        }
        if self.screen != Screen::Game || self.correct_answer.is_some() {
            return Err(Error::NoQuestion);
        }
        if choice >= prompt.choices.len() {
            return Err(Error::InvalidChoice(choice));
        }

        if self.timer.is_expired_at(now) {
            return self.emit_timeout(channel);
        }

        let time_taken = self.timer.seconds_taken_at(now);
        self.timer.stop_at(now);
        self.emit_answer(choice as i64, time_taken, channel)
    }

    fn emit_timeout<C: Channel>(&mut self, channel: &C) -> Result<(), Error> {
        self.timer.expire();
        let time_taken = self.timer.limit().as_secs();
        self.emit_answer(-1, time_taken, channel)
    }

    fn emit_answer<C: Channel>(
        &mut self,
        answer: i64,
        time_taken: u64,
        channel: &C,
    ) -> Result<(), Error> {
        let room_code = self.room_code()?;
        self.has_answered = true;

        channel.emit(&ClientEvent::SubmitAnswer {
            room_code,
            answer,
            time_taken,
        });

        Ok(())
    }

    /// Sends a line to the room chat
    ///
    /// Surrounding whitespace is trimmed and empty lines are not sent.
    ///
    /// # Errors
    ///
    /// * `Error::NotInRoom` - outside of a room
    /// * `Error::MessageTooLong` - the line exceeds the maximum length
    pub fn send_chat<C: Channel>(&self, message: &str, channel: &C) -> Result<(), Error> {
        let room_code = self.room_code()?;
        let message = message.trim();
        if message.is_empty() {
            return Ok(());
        }
        if message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(Error::MessageTooLong);
        }

        channel.emit(&ClientEvent::ChatMessage {
            room_code,
            message: message.to_owned(),
        });

        Ok(())
    }

    /// Parses and applies a raw message received from the server
    ///
    /// # Errors
    ///
    /// Returns `protocol::Error::Malformed` if the message is not a known
    /// event; the client is left unchanged in that case.
    pub fn receive_message<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        message: &str,
        tunnel: &T,
        schedule_message: S,
    ) -> Result<(), protocol::Error> {
        let event = ServerEvent::from_message(message)?;
        self.receive_event(event, tunnel, schedule_message);
        Ok(())
    }

    /// Applies an event received from the server
    pub fn receive_event<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        event: ServerEvent,
        tunnel: &T,
        schedule_message: S,
    ) {
        self.receive_event_at(event, SystemTime::now(), tunnel, schedule_message);
    }

    /// Applies an event received from the server at `now`
    pub fn receive_event_at<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        event: ServerEvent,
        now: SystemTime,
        tunnel: &T,
        mut schedule_message: S,
    ) {
        tracing::debug!(?event, "received room event");

        match event {
            ServerEvent::Connected { sid } => {
                self.sid = Some(sid);
            }
            ServerEvent::RoomCreated { room_code, room } => {
                self.enter_room(room_code, room, true, tunnel);
            }
            ServerEvent::RoomJoined { room_code, room } => {
                let is_host = self.sid.as_ref() == Some(&room.host_sid);
                self.enter_room(room_code, room, is_host, tunnel);
            }
            ServerEvent::PlayerJoined {
                players,
                players_count,
            } => {
                self.set_players(players, tunnel);
                self.add_system_line(
                    format!("A player joined the room ({players_count} players)"),
                    tunnel,
                );
            }
            ServerEvent::PlayerLeft {
                sid,
                players_count,
                players,
            } => {
                let players = players.unwrap_or_else(|| {
                    self.players
                        .iter()
                        .filter(|p| p.sid != sid)
                        .cloned()
                        .collect_vec()
                });
                self.set_players(players, tunnel);
                self.add_system_line(
                    format!("A player left the room ({players_count} players)"),
                    tunnel,
                );
            }
            ServerEvent::PlayerReadyUpdate { players } => {
                self.set_players(players, tunnel);
            }
            ServerEvent::AllPlayersReady {} => {
                self.all_ready = true;
                tunnel.send_message(&UpdateMessage::AllPlayersReady.into());
            }
            ServerEvent::GameStarted { total_questions } => {
                self.total_questions = total_questions;
                self.question_number = 0;
                self.prompt = None;
                self.change_screen(Screen::Game, tunnel);
                self.add_system_line("The game is starting!".to_owned(), tunnel);

                tracing::info!(total_questions, "room game started");
            }
            ServerEvent::NewQuestion {
                question_number,
                total_questions,
                question,
            } => {
                self.change_screen(Screen::Game, tunnel);

                self.question_number = question_number;
                self.total_questions = total_questions;
                self.has_answered = false;
                self.answered_count = 0;
                self.correct_answer = None;
                self.last_result = None;
                self.timer.start_at(now);
                self.prompt = Some(question.clone());

                tunnel.send_message(
                    &UpdateMessage::Question {
                        question_number,
                        total_questions,
                        question,
                        duration: self.timer.limit(),
                    }
                    .into(),
                );
                tunnel.send_message(&UpdateMessage::Scoreboard(self.standings()).into());

                schedule_message(
                    AlarmMessage::QuestionTimeout { question_number }.into(),
                    self.timer.limit(),
                );
            }
            ServerEvent::PlayerAnswered {
                answered_count,
                total_players,
                ..
            } => {
                self.answered_count = answered_count;
                tunnel.send_message(
                    &UpdateMessage::AnsweredCount {
                        answered_count,
                        total_players,
                    }
                    .into(),
                );
            }
            ServerEvent::QuestionResults {
                correct_answer,
                explanation,
                players,
                answers,
            } => {
                self.timer.stop_at(now);
                self.correct_answer = Some(correct_answer);
                self.last_result = self
                    .sid
                    .as_ref()
                    .and_then(|sid| answers.get(sid))
                    .copied();
                self.players = players;

                tunnel.send_message(&UpdateMessage::Scoreboard(self.standings()).into());
                tunnel.send_message(
                    &UpdateMessage::AnswerRevealed {
                        correct_answer,
                        explanation: explanation.clone(),
                        result: self.last_result,
                    }
                    .into(),
                );
                self.add_system_line(format!("✅ {explanation}"), tunnel);
            }
            ServerEvent::GameEnded { players } => {
                self.timer.stop_at(now);
                self.players = players;
                self.change_screen(Screen::Results, tunnel);

                tracing::info!(
                    rank = self.own_rank(),
                    winner = self.is_winner(),
                    "room game ended"
                );

                tunnel.send_message(
                    &UpdateMessage::Results {
                        podium: self.podium(),
                        standings: self.standings(),
                        is_winner: self.is_winner(),
                    }
                    .into(),
                );
            }
            ServerEvent::ChatMessage {
                player_name,
                message,
                timestamp,
            } => {
                self.add_line(
                    ChatLine {
                        author: player_name,
                        message,
                        timestamp: Some(timestamp).filter(|t| !t.is_empty()),
                        is_system: false,
                    },
                    tunnel,
                );
            }
            ServerEvent::NewHost { host_sid } => {
                if self.sid.as_ref() == Some(&host_sid) && !self.is_host {
                    self.is_host = true;
                    tunnel.send_message(&UpdateMessage::HostPromoted.into());
                    self.add_system_line("You are now the host of the room".to_owned(), tunnel);
                }
            }
            ServerEvent::Error { message } => {
                tracing::warn!(%message, "room server rejected a request");
                tunnel.send_message(&UpdateMessage::Error(message).into());
            }
        }
    }

    fn enter_room<T: Tunnel>(
        &mut self,
        room_code: RoomCode,
        room: RoomSnapshot,
        is_host: bool,
        tunnel: &T,
    ) {
        tracing::info!(%room_code, is_host, players = room.players.len(), "entered room");

        self.room_code = Some(room_code);
        self.is_host = is_host;
        self.max_players = room.max_players;
        self.ready = false;
        self.all_ready = false;

        self.change_screen(Screen::Lobby, tunnel);
        self.set_players(room.players, tunnel);
    }

    fn change_screen<T: Tunnel>(&mut self, screen: Screen, tunnel: &T) {
        if self.screen != screen {
            self.screen = screen;
            tunnel.send_message(&UpdateMessage::Screen(screen).into());
        }
    }

    fn set_players<T: Tunnel>(&mut self, players: Vec<Player>, tunnel: &T) {
        self.players = players;
        tunnel.send_message(&UpdateMessage::Players(self.players.clone()).into());
    }

    fn add_system_line<T: Tunnel>(&mut self, message: String, tunnel: &T) {
        self.add_line(ChatLine::system(message), tunnel);
    }

    fn add_line<T: Tunnel>(&mut self, line: ChatLine, tunnel: &T) {
        tunnel.send_message(&UpdateMessage::Chat(line.clone()).into());
        self.chat.push(line);
    }

    /// Handles a scheduled alarm
    ///
    /// When the time runs out on a question this player has not answered,
    /// an empty answer is submitted on their behalf with the full time
    /// taken.
    ///
    /// Returns whether an answer was submitted.
    pub fn receive_alarm<C: Channel>(
        &mut self,
        message: &crate::AlarmMessage,
        channel: &C,
    ) -> bool {
        let crate::AlarmMessage::Multiplayer(AlarmMessage::QuestionTimeout { question_number }) =
            message
        else {
            return false;
        };

        if self.screen != Screen::Game
            || *question_number != self.question_number
            || self.has_answered
            || self.correct_answer.is_some()
        {
            return false;
        }

        self.emit_timeout(channel).is_ok()
    }

    /// Returns the screen to show
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Returns the connection identifier, once connected
    pub fn sid(&self) -> Option<&Sid> {
        self.sid.as_ref()
    }

    /// Returns the name this player uses in rooms
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the code of the current room
    pub fn current_room(&self) -> Option<RoomCode> {
        self.room_code
    }

    /// Returns whether this player hosts the room
    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// Returns whether this player is marked as ready
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Returns whether the server reported every player as ready
    pub fn all_ready(&self) -> bool {
        self.all_ready
    }

    /// Returns the players in the room, in server order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Returns the room capacity
    pub fn max_players(&self) -> usize {
        self.max_players
    }

    /// Returns the open question
    pub fn prompt(&self) -> Option<&QuestionPrompt> {
        self.prompt.as_ref()
    }

    /// Returns whether the current question was answered by this player
    pub fn has_answered(&self) -> bool {
        self.has_answered
    }

    /// Returns how this player fared on the last revealed question
    pub fn last_result(&self) -> Option<AnswerResult> {
        self.last_result
    }

    /// Returns the chat history
    pub fn chat(&self) -> &[ChatLine] {
        &self.chat
    }

    /// Returns the share of the game already played, in percent
    pub fn progress_percent(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.;
        }
        self.question_number as f64 / self.total_questions as f64 * 100.
    }

    /// Returns the players ranked by score
    pub fn standings(&self) -> Vec<Standing> {
        leaderboard::standings(&self.players)
    }

    /// Returns the podium in display order
    pub fn podium(&self) -> Vec<PodiumPlace> {
        leaderboard::podium(&self.players)
    }

    /// Returns the rank of this player
    pub fn own_rank(&self) -> Option<usize> {
        self.sid
            .as_ref()
            .and_then(|sid| leaderboard::rank_of(&self.players, sid))
    }

    /// Returns whether this player tops the ranking
    pub fn is_winner(&self) -> bool {
        self.own_rank() == Some(1)
    }

    /// Returns how close the countdown is to running out at `now`
    pub fn urgency_at(&self, now: SystemTime) -> Urgency {
        self.timer.urgency_at(now)
    }

    /// Sends the whole room view through the tunnel
    pub fn sync<T: Tunnel>(&self, tunnel: &T) {
        tunnel.send_state(&self.state_message().into());
    }

    /// Returns the message that rebuilds the whole room view
    pub fn state_message(&self) -> SyncMessage {
        self.state_message_at(SystemTime::now())
    }

    /// Returns the message that rebuilds the whole room view at `now`
    pub fn state_message_at(&self, now: SystemTime) -> SyncMessage {
        let chat = self.chat.clone();

        match (self.screen, self.room_code) {
            (Screen::Menu, _) | (_, None) => SyncMessage::Menu,
            (Screen::Lobby, Some(room_code)) => SyncMessage::Lobby {
                room_code,
                is_host: self.is_host,
                ready: self.ready,
                all_ready: self.all_ready,
                max_players: self.max_players,
                players: self.players.clone(),
                chat,
            },
            (Screen::Game, Some(_)) => SyncMessage::Game {
                question_number: self.question_number,
                total_questions: self.total_questions,
                question: self.prompt.clone(),
                remaining: self.timer.remaining_at(now),
                has_answered: self.has_answered,
                answered_count: self.answered_count,
                correct_answer: self.correct_answer,
                standings: self.standings(),
                chat,
            },
            (Screen::Results, Some(_)) => SyncMessage::Results {
                podium: self.podium(),
                standings: self.standings(),
                is_winner: self.is_winner(),
                chat,
            },
        }
    }
}
