//! Single-player timed quiz
//!
//! A game draws up to forty questions from one category and asks them one
//! at a time. Every question runs against a thirty second countdown; a
//! correct answer earns points (see [`crate::scoring`]) and extends the
//! streak, while a wrong answer or a timeout costs a life. The game ends in
//! victory once every question was asked, or in defeat when the last life
//! is lost.
//!
//! The controller never reads a clock by itself for timeouts: it asks the
//! caller to schedule a [`AlarmMessage::QuestionTimeout`] and expects it
//! back through [`Game::receive_alarm`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use enum_map::EnumMap;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use web_time::SystemTime;

use crate::{
    constants::quiz::MAX_QUESTIONS,
    history::{ScoreHistory, ScoreRecord},
    question::{self, Difficulty, Question, QuestionPrompt, QuestionSource},
    scoring::Points,
    session::{ScoreSink, Tunnel},
    settings::Settings,
    storage::Storage,
    timer::{QuestionTimer, Urgency},
};

/// Errors that can occur when setting up a game
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The questions could not be loaded
    #[error(transparent)]
    Questions(#[from] question::Error),
    /// The category has no question to ask
    #[error("no questions available in {0}")]
    NoQuestions(String),
}

/// What happened to a single question
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    /// Choice made by the player, none if the time ran out
    pub selected: Option<usize>,
    /// Index of the correct choice
    pub correct_answer: usize,
    /// Whether the selected choice was correct
    pub is_correct: bool,
    /// Whether the time ran out
    pub timed_out: bool,
    /// Points earned, only for correct answers
    pub points: Option<Points>,
    /// Explanation of the solution
    pub explanation: String,
    /// Time taken to answer
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub response_time: Duration,
}

/// An answered question, kept for the final summary
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    /// Identifier of the question
    pub question_id: u32,
    /// Difficulty of the question
    pub difficulty: Difficulty,
    /// Choice made by the player, none if the time ran out
    pub selected: Option<usize>,
    /// Whether the selected choice was correct
    pub is_correct: bool,
    /// Time taken to answer
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub response_time: Duration,
}

/// Correct and answered counts for one difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// Number of correct answers
    pub correct: usize,
    /// Number of questions answered
    pub answered: usize,
}

/// Final results of a game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Whether every question was asked before running out of lives
    pub victory: bool,
    /// Final score
    pub score: u64,
    /// Number of correct answers
    pub correct: usize,
    /// Number of questions answered, including timeouts
    pub answered: usize,
    /// Number of questions drawn for the game
    pub total_questions: usize,
    /// Longest run of correct answers
    pub max_streak: u32,
    /// Average seconds per answer, rounded to one decimal
    pub average_time: f64,
    /// Results per difficulty
    pub by_difficulty: EnumMap<Difficulty, Tally>,
}

/// Phase of the game
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum Phase {
    /// Questions are loaded but the first one was not shown yet
    #[default]
    Unstarted,
    /// The current question is waiting for an answer
    Question,
    /// The current question was answered and its solution is shown
    Explanation(Outcome),
    /// The game is over
    Over(Summary),
}

/// Update messages sent to the presentation layer during a game
#[serde_with::serde_as]
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// A new question is open for answers
    QuestionAnnouncement {
        /// Index of the question (0-based)
        index: usize,
        /// Number of questions in the game
        count: usize,
        /// The question without its solution
        question: QuestionPrompt,
        /// Time allowed to answer
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        duration: Duration,
    },
    /// The current question was answered or timed out
    AnswerResult {
        /// What happened
        outcome: Outcome,
        /// Score after the answer
        score: u64,
        /// Lives left after the answer
        lives: u8,
        /// Streak after the answer
        streak: u32,
    },
    /// The game is over
    GameOver(Summary),
}

/// Alarm messages for timed events in a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// The time to answer a question ran out
    QuestionTimeout {
        /// Index of the question the alarm was scheduled for
        index: usize,
    },
}

/// Synchronization messages describing the whole game view
#[serde_with::serde_as]
#[derive(Debug, Serialize, Clone)]
pub enum SyncMessage {
    /// A question is waiting for an answer
    Question {
        /// Index of the question (0-based)
        index: usize,
        /// Number of questions in the game
        count: usize,
        /// The question without its solution
        question: QuestionPrompt,
        /// Time left to answer
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        remaining: Duration,
        /// Current score
        score: u64,
        /// Lives left
        lives: u8,
        /// Current streak
        streak: u32,
    },
    /// The solution of the current question is shown
    Explanation {
        /// Index of the question (0-based)
        index: usize,
        /// Number of questions in the game
        count: usize,
        /// The question without its solution
        question: QuestionPrompt,
        /// What happened
        outcome: Outcome,
        /// Current score
        score: u64,
        /// Lives left
        lives: u8,
        /// Current streak
        streak: u32,
    },
    /// The game is over
    Over(Summary),
}

/// A single-player game in progress
#[derive(Debug, Clone, Serialize)]
pub struct Game {
    settings: Settings,
    questions: Vec<Question>,
    index: usize,
    score: u64,
    correct: usize,
    lives: u8,
    streak: u32,
    max_streak: u32,
    timer: QuestionTimer,
    total_time: Duration,
    answers: Vec<AnswerRecord>,
    phase: Phase,
}

impl Game {
    /// Sets up a game with shuffled questions of the selected category
    ///
    /// # Errors
    ///
    /// * `Error::Questions` - the source failed to provide the questions
    /// * `Error::NoQuestions` - the category is empty
    pub fn new<Q: QuestionSource>(
        settings: Settings,
        source: &Q,
        rng: &mut fastrand::Rng,
    ) -> Result<Self, Error> {
        let questions = question::draw(source.fetch(&settings.category)?, MAX_QUESTIONS, rng);
        Self::with_questions(settings, questions)
    }

    /// Sets up a game asking `questions` in order
    ///
    /// # Errors
    ///
    /// Returns `Error::NoQuestions` if `questions` is empty.
    pub fn with_questions(settings: Settings, questions: Vec<Question>) -> Result<Self, Error> {
        if questions.is_empty() {
            return Err(Error::NoQuestions(settings.category));
        }

        tracing::info!(
            category = %settings.category,
            mode = %settings.mode,
            questions = questions.len(),
            "solo game ready"
        );

        Ok(Self {
            lives: settings.mode.lives(),
            settings,
            questions,
            index: 0,
            score: 0,
            correct: 0,
            streak: 0,
            max_streak: 0,
            timer: QuestionTimer::default(),
            total_time: Duration::ZERO,
            answers: Vec::new(),
            phase: Phase::Unstarted,
        })
    }

    /// Shows the first question
    pub fn play<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        tunnel: &T,
        schedule_message: S,
    ) {
        self.play_at(SystemTime::now(), tunnel, schedule_message);
    }

    /// Shows the first question, with its countdown starting at `now`
    pub fn play_at<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        now: SystemTime,
        tunnel: &T,
        schedule_message: S,
    ) {
        if self.phase == Phase::Unstarted {
            self.send_question_announcement(now, tunnel, schedule_message);
        }
    }

    fn send_question_announcement<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        now: SystemTime,
        tunnel: &T,
        mut schedule_message: S,
    ) {
        let Some(question) = self.questions.get(self.index) else {
            return;
        };

        self.phase = Phase::Question;
        self.timer.start_at(now);

        tunnel.send_message(
            &UpdateMessage::QuestionAnnouncement {
                index: self.index,
                count: self.questions.len(),
                question: question.prompt(),
                duration: self.timer.limit(),
            }
            .into(),
        );

        schedule_message(
            AlarmMessage::QuestionTimeout { index: self.index }.into(),
            self.timer.limit(),
        );
    }

    /// Answers the current question with the choice at `choice`
    ///
    /// Returns whether the answer was accepted: answers outside of the
    /// question phase or pointing past the last choice are ignored.
    pub fn select_answer<T: Tunnel>(&mut self, choice: usize, tunnel: &T) -> bool {
        self.select_answer_at(choice, SystemTime::now(), tunnel)
    }

    /// Answers the current question with the choice at `choice`, at `now`
    ///
    /// Once the countdown has run out the choice no longer counts: the
    /// question is resolved as a timeout, even if the alarm has not fired.
    pub fn select_answer_at<T: Tunnel>(
        &mut self,
        choice: usize,
        now: SystemTime,
        tunnel: &T,
    ) -> bool {
        if self.phase != Phase::Question {
            return false;
        }
        let Some(question) = self.questions.get(self.index) else {
            return false;
        };
        if choice >= question.choices.len() {
            return false;
        }
        if self.timer.is_expired_at(now) {
            self.time_out(tunnel);
            return false;
        }

        self.timer.stop_at(now);
        let response_time = self.timer.elapsed_at(now).min(self.timer.limit());

        self.resolve(Some(choice), response_time, tunnel);

        true
    }

    fn time_out<T: Tunnel>(&mut self, tunnel: &T) {
        self.timer.expire();
        self.resolve(None, self.timer.limit(), tunnel);
    }

    fn resolve<T: Tunnel>(
        &mut self,
        selected: Option<usize>,
        response_time: Duration,
        tunnel: &T,
    ) {
        let Some(question) = self.questions.get(self.index) else {
            return;
        };

        let is_correct = selected.is_some_and(|choice| question.is_correct(choice));
        let timed_out = selected.is_none();

        self.answers.push(AnswerRecord {
            question_id: question.id,
            difficulty: question.difficulty,
            selected,
            is_correct,
            response_time,
        });
        self.total_time += response_time;

        let points = if is_correct {
            self.streak += 1;
            self.max_streak = self.max_streak.max(self.streak);
            self.correct += 1;

            let points = Points::new(
                question.difficulty,
                response_time,
                self.streak,
                self.settings.mode.multiplier(),
            );
            self.score += points.total();
            Some(points)
        } else {
            self.lives = self.lives.saturating_sub(1);
            self.streak = 0;
            None
        };

        let outcome = Outcome {
            selected,
            correct_answer: question.correct,
            is_correct,
            timed_out,
            points,
            explanation: if timed_out {
                format!("Time's up! {}", question.explanation)
            } else {
                question.explanation.clone()
            },
            response_time,
        };

        tracing::debug!(
            index = self.index,
            is_correct,
            timed_out,
            score = self.score,
            lives = self.lives,
            "question resolved"
        );

        tunnel.send_message(
            &UpdateMessage::AnswerResult {
                outcome: outcome.clone(),
                score: self.score,
                lives: self.lives,
                streak: self.streak,
            }
            .into(),
        );

        if self.lives == 0 {
            self.finish(false, tunnel);
        } else {
            self.phase = Phase::Explanation(outcome);
        }
    }

    /// Moves on from the explanation to the next question, or ends the game
    /// after the last one
    ///
    /// Returns whether the game moved on.
    pub fn next_question<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        tunnel: &T,
        schedule_message: S,
    ) -> bool {
        self.next_question_at(SystemTime::now(), tunnel, schedule_message)
    }

    /// Moves on to the next question, with its countdown starting at `now`
    pub fn next_question_at<T: Tunnel, S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        now: SystemTime,
        tunnel: &T,
        schedule_message: S,
    ) -> bool {
        if !matches!(self.phase, Phase::Explanation(_)) {
            return false;
        }

        self.index += 1;

        if self.index >= self.questions.len() {
            self.finish(true, tunnel);
        } else {
            self.send_question_announcement(now, tunnel, schedule_message);
        }

        true
    }

    fn finish<T: Tunnel>(&mut self, victory: bool, tunnel: &T) {
        let summary = self.summary(victory);

        tracing::info!(
            victory,
            score = summary.score,
            correct = summary.correct,
            answered = summary.answered,
            "solo game over"
        );

        tunnel.send_message(&UpdateMessage::GameOver(summary.clone()).into());
        self.phase = Phase::Over(summary);
    }

    fn summary(&self, victory: bool) -> Summary {
        let mut by_difficulty = EnumMap::<Difficulty, Tally>::default();
        for answer in &self.answers {
            let tally = &mut by_difficulty[answer.difficulty];
            tally.answered += 1;
            if answer.is_correct {
                tally.correct += 1;
            }
        }

        Summary {
            victory,
            score: self.score,
            correct: self.correct,
            answered: self.answers.len(),
            total_questions: self.questions.len(),
            max_streak: self.max_streak,
            average_time: self.average_time(),
            by_difficulty,
        }
    }

    /// Returns the average seconds per answer, rounded to one decimal
    pub fn average_time(&self) -> f64 {
        if self.answers.is_empty() {
            return 0.;
        }
        let average = self.total_time.as_secs_f64() / self.answers.len() as f64;
        (average * 10.).round() / 10.
    }

    /// Handles a scheduled alarm
    ///
    /// A timeout only applies to the question it was scheduled for, and only
    /// while that question is still waiting for an answer.
    ///
    /// Returns whether the alarm changed the game.
    pub fn receive_alarm<T: Tunnel>(
        &mut self,
        message: &crate::AlarmMessage,
        tunnel: &T,
    ) -> bool {
        let crate::AlarmMessage::Solo(AlarmMessage::QuestionTimeout { index }) = message else {
            return false;
        };

        if *index != self.index || self.phase != Phase::Question {
            return false;
        }

        self.time_out(tunnel);

        true
    }

    /// Returns the current phase
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Returns the settings the game was set up with
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the index of the current question (0-based)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of questions in the game
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Returns the current score
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Returns the lives left
    pub fn lives(&self) -> u8 {
        self.lives
    }

    /// Returns the current streak
    pub fn streak(&self) -> u32 {
        self.streak
    }

    /// Returns the answered questions, in order
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Returns the share of questions already reached, in percent
    pub fn progress_percent(&self) -> f64 {
        (self.index + 1).min(self.questions.len()) as f64 / self.questions.len() as f64 * 100.
    }

    /// Returns one heart per life the mode starts with, full while the
    /// life is still available
    pub fn lives_display(&self) -> String {
        (0..self.settings.mode.lives())
            .map(|i| if i < self.lives { "❤️" } else { "💔" })
            .collect()
    }

    /// Returns how close the countdown is to running out at `now`
    pub fn urgency_at(&self, now: SystemTime) -> Urgency {
        self.timer.urgency_at(now)
    }

    /// Returns the timer of the current question
    pub fn timer(&self) -> &QuestionTimer {
        &self.timer
    }

    /// Builds the history record of a finished game
    ///
    /// Returns nothing while the game is still running.
    pub fn score_record(&self, date: DateTime<Utc>) -> Option<ScoreRecord> {
        let Phase::Over(summary) = &self.phase else {
            return None;
        };

        Some(ScoreRecord {
            player_name: self.settings.player_name.clone(),
            category: self.settings.category.clone(),
            mode: self.settings.mode,
            score: summary.score,
            correct_answers: summary.correct,
            total_questions: summary.answered,
            max_streak: summary.max_streak,
            avg_time: summary.average_time,
            date,
        })
    }

    /// Appends a finished game to the stored history and uploads it
    ///
    /// An upload failure is logged and otherwise ignored; the local history
    /// is kept either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored history is unreadable. Nothing is
    /// written in that case.
    pub fn save_score<S: Storage, K: ScoreSink>(
        &self,
        storage: &mut S,
        sink: &K,
        date: DateTime<Utc>,
    ) -> Result<Option<ScoreRecord>, crate::history::Error> {
        let Some(record) = self.score_record(date) else {
            return Ok(None);
        };

        let mut history = ScoreHistory::load(storage)?;
        history.push(record.clone());
        history.save(storage);

        if let Err(error) = sink.save_score(&record) {
            tracing::warn!(%error, "could not upload score");
        }

        Ok(Some(record))
    }

    /// Returns a plain text summary of the game to share
    pub fn share_text(&self, origin: &str) -> String {
        format!(
            "🎯 Quiz Master - Score: {} pts\n✅ {}/{} correct answers\n🔥 Best streak: {}\n\nPlay too: {origin}",
            self.score,
            self.correct,
            self.answers.len(),
            self.max_streak,
        )
    }

    /// Sends the whole game view through the tunnel
    pub fn sync<T: Tunnel>(&self, tunnel: &T) {
        tunnel.send_state(&self.state_message().into());
    }

    /// Returns the message that rebuilds the whole game view
    pub fn state_message(&self) -> SyncMessage {
        self.state_message_at(SystemTime::now())
    }

    /// Returns the message that rebuilds the whole game view at `now`
    ///
    /// A game that was not started yet is shown at its first question with
    /// a full countdown.
    pub fn state_message_at(&self, now: SystemTime) -> SyncMessage {
        let index = self.index.min(self.questions.len().saturating_sub(1));
        let prompt = || self.questions[index].prompt();

        match &self.phase {
            Phase::Unstarted | Phase::Question => SyncMessage::Question {
                index,
                count: self.questions.len(),
                question: prompt(),
                remaining: self.timer.remaining_at(now),
                score: self.score,
                lives: self.lives,
                streak: self.streak,
            },
            Phase::Explanation(outcome) => SyncMessage::Explanation {
                index,
                count: self.questions.len(),
                question: prompt(),
                outcome: outcome.clone(),
                score: self.score,
                lives: self.lives,
                streak: self.streak,
            },
            Phase::Over(summary) => SyncMessage::Over(summary.clone()),
        }
    }
}
