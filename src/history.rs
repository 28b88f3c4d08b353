//! Score history of single-player games and the statistics derived from it
//!
//! Finished games are appended to a JSON array kept in [`Storage`]. The
//! records use camelCase field names and may carry their average time as a
//! string, as older front ends wrote them.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use thiserror::Error;

use crate::{
    TruncatedVec,
    constants::history::{PROGRESSION_LIMIT, TOP_LIMIT},
    question,
    settings::GameMode,
    storage::{Storage, keys},
};

/// A finished single-player game
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    /// Name the player entered
    pub player_name: String,
    /// Category of the questions
    pub category: String,
    /// Mode the game was played in
    ///
    /// Unknown or missing modes read as [`GameMode::Solo`].
    #[serde(default, deserialize_with = "stored_mode")]
    pub mode: GameMode,
    /// Final score
    pub score: u64,
    /// Number of correct answers
    pub correct_answers: usize,
    /// Number of questions answered, including timeouts
    pub total_questions: usize,
    /// Longest run of correct answers
    #[serde(default)]
    pub max_streak: u32,
    /// Average seconds per answer, rounded to one decimal
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[serde(default)]
    pub avg_time: f64,
    /// When the game ended
    pub date: DateTime<Utc>,
}

impl ScoreRecord {
    /// Returns the share of correct answers as a percentage
    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            0.
        } else {
            self.correct_answers as f64 / self.total_questions as f64 * 100.
        }
    }
}

fn stored_mode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<GameMode, D::Error> {
    let mode = Option::<String>::deserialize(deserializer)?;
    Ok(GameMode::from_stored(mode.as_deref().unwrap_or_default()))
}

/// Errors that can occur when loading the score history
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The stored history is not a valid list of records
    #[error("stored score history is corrupt: {0}")]
    Corrupt(String),
}

/// Restricts statistics to one category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every record
    #[default]
    All,
    /// Records of a single category
    Category(String),
}

impl CategoryFilter {
    /// Returns whether `record` passes the filter
    pub fn matches(&self, record: &ScoreRecord) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => &record.category == category,
        }
    }
}

impl From<&str> for CategoryFilter {
    /// Reads a filter as selected in a drop-down, where `all` means no filter
    fn from(value: &str) -> Self {
        match value.trim() {
            "" | "all" => Self::All,
            category => Self::Category(category.to_owned()),
        }
    }
}

/// Aggregated statistics over a set of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Number of games played
    pub total_games: usize,
    /// Average score, rounded
    pub average_score: u64,
    /// Longest streak of any game
    pub best_streak: u32,
    /// Average accuracy in percent, rounded
    pub average_accuracy: u64,
}

/// A point on the progression chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressPoint {
    /// Label of the game, `#1` being the oldest shown
    pub label: String,
    /// Score of the game
    pub score: u64,
}

/// Average score of a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAverage {
    /// Category identifier
    pub category: String,
    /// Display name of the category
    pub name: String,
    /// Number of games played in it
    pub games: usize,
    /// Average score, rounded
    pub average_score: u64,
}

fn rounded_mean(values: impl Iterator<Item = f64>) -> u64 {
    let (sum, count) = values.fold((0., 0_usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0
    } else {
        (sum / count as f64).round() as u64
    }
}

/// Every finished game, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreHistory {
    records: Vec<ScoreRecord>,
}

impl ScoreHistory {
    /// Loads the history from storage
    ///
    /// A storage without history yields an empty history.
    ///
    /// # Errors
    ///
    /// Returns `Error::Corrupt` if the stored value cannot be read as a list
    /// of score records.
    pub fn load<S: Storage>(storage: &S) -> Result<Self, Error> {
        let Some(raw) = storage.get(keys::SCORES) else {
            return Ok(Self::default());
        };

        let mut history: Self =
            serde_json::from_str(&raw).map_err(|e| Error::Corrupt(e.to_string()))?;

        // games without answers were saved with a "NaN" average
        for record in &mut history.records {
            if !record.avg_time.is_finite() {
                record.avg_time = 0.;
            }
        }

        Ok(history)
    }

    /// Writes the history to storage
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn save<S: Storage>(&self, storage: &mut S) {
        storage.set(
            keys::SCORES,
            serde_json::to_string(self).expect("default serializer cannot fail"),
        );
    }

    /// Removes every record, both here and in storage
    pub fn clear<S: Storage>(&mut self, storage: &mut S) {
        self.records.clear();
        storage.remove(keys::SCORES);
    }

    /// Appends a finished game
    pub fn push(&mut self, record: ScoreRecord) {
        self.records.push(record);
    }

    /// Returns every record, oldest first
    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    /// Returns the number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether no game was recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn filtered<'a>(&'a self, filter: &'a CategoryFilter) -> impl Iterator<Item = &'a ScoreRecord> {
        self.records.iter().filter(move |r| filter.matches(r))
    }

    /// Returns the best games, highest score first
    ///
    /// Games with the same score keep their chronological order.
    pub fn top(&self, filter: &CategoryFilter) -> TruncatedVec<ScoreRecord> {
        let ranked = self
            .filtered(filter)
            .sorted_by(|a, b| b.score.cmp(&a.score))
            .cloned()
            .collect_vec();

        TruncatedVec::head_of(ranked, TOP_LIMIT)
    }

    /// Computes aggregated statistics
    pub fn stats(&self, filter: &CategoryFilter) -> Stats {
        let records = self.filtered(filter).collect_vec();

        Stats {
            total_games: records.len(),
            average_score: rounded_mean(records.iter().map(|r| r.score as f64)),
            best_streak: records.iter().map(|r| r.max_streak).max().unwrap_or(0),
            average_accuracy: rounded_mean(records.iter().map(|r| r.accuracy())),
        }
    }

    /// Returns the scores of the most recent games, oldest first
    pub fn progression(&self, filter: &CategoryFilter) -> Vec<ProgressPoint> {
        let records = self.filtered(filter).collect_vec();
        let skip = records.len().saturating_sub(PROGRESSION_LIMIT);

        records
            .into_iter()
            .skip(skip)
            .enumerate()
            .map(|(index, r)| ProgressPoint {
                label: format!("#{}", index + 1),
                score: r.score,
            })
            .collect_vec()
    }

    /// Returns the average score of every category played, in the order
    /// they were first played
    pub fn category_averages(&self) -> Vec<CategoryAverage> {
        self.records
            .iter()
            .map(|r| r.category.as_str())
            .unique()
            .map(|category| {
                let scores = self
                    .records
                    .iter()
                    .filter(|r| r.category == category)
                    .map(|r| r.score as f64)
                    .collect_vec();

                CategoryAverage {
                    category: category.to_owned(),
                    name: question::display_name(category),
                    games: scores.len(),
                    average_score: rounded_mean(scores.into_iter()),
                }
            })
            .collect_vec()
    }

    /// Renders every record as CSV, or nothing if there is no record
    ///
    /// Every line, the header included, ends with a newline.
    pub fn export_csv(&self) -> Option<String> {
        if self.records.is_empty() {
            return None;
        }

        let header = "Player,Category,Mode,Score,Correct,Total,Max Streak,Avg Time,Date";
        let rows = self.records.iter().map(|r| {
            [
                csv_field(&r.player_name),
                csv_field(&question::display_name(&r.category)),
                r.mode.to_string(),
                r.score.to_string(),
                r.correct_answers.to_string(),
                r.total_questions.to_string(),
                r.max_streak.to_string(),
                format!("{:.1}", r.avg_time),
                r.date.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]
            .join(",")
        });

        Some(
            std::iter::once(header.to_owned())
                .chain(rows)
                .map(|line| line + "\n")
                .collect(),
        )
    }
}

/// Quotes a CSV field when it would otherwise break the row
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

/// Returns the name of a CSV export made on `date`
pub fn export_file_name(date: DateTime<Utc>) -> String {
    format!("quiz-scores-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::storage::MemoryStorage;

    pub(crate) fn record(category: &str, score: u64, correct: usize, total: usize) -> ScoreRecord {
        ScoreRecord {
            player_name: "Rado".to_owned(),
            category: category.to_owned(),
            mode: GameMode::Solo,
            score,
            correct_answers: correct,
            total_questions: total,
            max_streak: correct as u32,
            avg_time: 6.5,
            date: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
        }
    }

    fn history(records: Vec<ScoreRecord>) -> ScoreHistory {
        ScoreHistory { records }
    }

    #[test]
    fn test_load_missing_is_empty() {
        let history = ScoreHistory::load(&MemoryStorage::new()).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_load_corrupt() {
        let mut storage = MemoryStorage::new();
        storage.set(keys::SCORES, "{not json".to_owned());
        assert!(matches!(
            ScoreHistory::load(&storage),
            Err(Error::Corrupt(_))
        ));
    }

    #[test]
    fn test_load_string_average_time() {
        let mut storage = MemoryStorage::new();
        storage.set(
            keys::SCORES,
            r#"[
                {"playerName": "Rado", "category": "maths", "mode": "hardcore", "score": 820,
                 "correctAnswers": 4, "totalQuestions": 5, "maxStreak": 3, "avgTime": "7.3",
                 "date": "2025-03-14T09:26:53.000Z"},
                {"playerName": "Rado", "category": "maths", "mode": "solo", "score": 0,
                 "correctAnswers": 0, "totalQuestions": 0, "maxStreak": 0, "avgTime": "NaN",
                 "date": "2025-03-15T09:26:53.000Z"}
            ]"#
            .to_owned(),
        );

        let history = ScoreHistory::load(&storage).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.records()[0].mode, GameMode::Hardcore);
        assert!((history.records()[0].avg_time - 7.3).abs() < f64::EPSILON);
        assert!(history.records()[1].avg_time.abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_unknown_mode_reads_as_solo() {
        let mut storage = MemoryStorage::new();
        storage.set(
            keys::SCORES,
            r#"[
                {"playerName": "Rado", "category": "maths", "mode": "hardcore", "score": 820,
                 "correctAnswers": 4, "totalQuestions": 5, "date": "2025-03-14T09:26:53.000Z"},
                {"playerName": "Rado", "category": "maths", "mode": "timed", "score": 300,
                 "correctAnswers": 3, "totalQuestions": 5, "date": "2025-03-15T09:26:53.000Z"},
                {"playerName": "Rado", "category": "maths", "score": 100,
                 "correctAnswers": 1, "totalQuestions": 5, "date": "2025-03-16T09:26:53.000Z"}
            ]"#
            .to_owned(),
        );

        let history = ScoreHistory::load(&storage).unwrap();
        assert_eq!(
            history.records().iter().map(|r| r.mode).collect_vec(),
            [GameMode::Hardcore, GameMode::Solo, GameMode::Solo]
        );
    }

    #[test]
    fn test_save_and_clear() {
        let mut storage = MemoryStorage::new();
        let mut history = ScoreHistory::default();
        history.push(record("maths", 300, 3, 4));
        history.save(&mut storage);

        let loaded = ScoreHistory::load(&storage).unwrap();
        assert_eq!(loaded, history);

        let value: serde_json::Value =
            serde_json::from_str(&storage.get(keys::SCORES).unwrap()).unwrap();
        assert_eq!(value[0]["playerName"], "Rado");
        assert_eq!(value[0]["correctAnswers"], 3);

        history.clear(&mut storage);
        assert!(history.is_empty());
        assert_eq!(storage.get(keys::SCORES), None);
    }

    #[test]
    fn test_category_filter_from_str() {
        assert_eq!(CategoryFilter::from("all"), CategoryFilter::All);
        assert_eq!(CategoryFilter::from(""), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from("python"),
            CategoryFilter::Category("python".to_owned())
        );
    }

    #[test]
    fn test_top_sorted_and_truncated() {
        let records = (0..15_u64)
            .map(|i| record(if i % 2 == 0 { "maths" } else { "python" }, i * 10, 1, 2))
            .collect_vec();
        let history = history(records);

        let top = history.top(&CategoryFilter::All);
        assert_eq!(top.exact_count(), 15);
        assert_eq!(top.items().len(), 10);
        assert_eq!(top.items()[0].score, 140);
        assert_eq!(top.items()[9].score, 50);

        let python = history.top(&CategoryFilter::Category("python".to_owned()));
        assert_eq!(python.exact_count(), 7);
        assert!(python.items().iter().all(|r| r.category == "python"));
    }

    #[test]
    fn test_top_ties_keep_chronological_order() {
        let mut first = record("maths", 100, 1, 1);
        first.player_name = "First".to_owned();
        let mut second = record("maths", 100, 1, 1);
        second.player_name = "Second".to_owned();

        let top = history(vec![first, second]).top(&CategoryFilter::All);
        assert_eq!(top.items()[0].player_name, "First");
    }

    #[test]
    fn test_stats() {
        let history = history(vec![
            record("maths", 100, 1, 2),
            record("maths", 250, 3, 3),
            record("python", 0, 0, 0),
        ]);

        assert_eq!(
            history.stats(&CategoryFilter::All),
            Stats {
                total_games: 3,
                average_score: 117,
                best_streak: 3,
                // (50 + 100 + 0) / 3
                average_accuracy: 50,
            }
        );
        assert_eq!(
            history.stats(&CategoryFilter::Category("maths".to_owned())),
            Stats {
                total_games: 2,
                average_score: 175,
                best_streak: 3,
                average_accuracy: 75,
            }
        );
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(
            ScoreHistory::default().stats(&CategoryFilter::All),
            Stats::default()
        );
    }

    #[test]
    fn test_progression_keeps_last_twenty() {
        let records = (0..25_u64).map(|i| record("maths", i, 0, 1)).collect_vec();
        let progression = history(records).progression(&CategoryFilter::All);

        assert_eq!(progression.len(), 20);
        assert_eq!(progression[0].label, "#1");
        assert_eq!(progression[0].score, 5);
        assert_eq!(progression[19].label, "#20");
        assert_eq!(progression[19].score, 24);
    }

    #[test]
    fn test_category_averages_first_seen_order() {
        let history = history(vec![
            record("python", 100, 1, 1),
            record("maths", 200, 1, 1),
            record("python", 301, 1, 1),
        ]);

        let averages = history.category_averages();
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].category, "python");
        assert_eq!(averages[0].name, "Python");
        assert_eq!(averages[0].games, 2);
        assert_eq!(averages[0].average_score, 201);
        assert_eq!(averages[1].category, "maths");
        assert_eq!(averages[1].average_score, 200);
    }

    #[test]
    fn test_export_csv() {
        assert_eq!(ScoreHistory::default().export_csv(), None);

        let mut quoted = record("culture_generale", 420, 4, 5);
        quoted.player_name = "Jean \"JJ\", Jr".to_owned();
        let csv = history(vec![record("maths", 300, 3, 4), quoted])
            .export_csv()
            .unwrap();

        assert!(csv.ends_with('\n'));
        let lines = csv.lines().collect_vec();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Player,Category,Mode,Score,Correct,Total,Max Streak,Avg Time,Date"
        );
        assert_eq!(
            lines[1],
            "Rado,Mathematics,solo,300,3,4,3,6.5,2025-03-14 09:26:53"
        );
        assert!(lines[2].starts_with("\"Jean \"\"JJ\"\", Jr\",General Knowledge,"));
        assert!(lines[2].ends_with(",2025-03-14 09:26:53"));
    }

    #[test]
    fn test_export_file_name() {
        let date = Utc.with_ymd_and_hms(2025, 1, 2, 23, 59, 0).unwrap();
        assert_eq!(export_file_name(date), "quiz-scores-2025-01-02.csv");
    }
}
