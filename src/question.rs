//! Questions, categories and question sources
//!
//! A question bank maps category identifiers to their questions, in the
//! shape of the `data/questions.json` file served by the quiz backend.
//! Controllers only depend on the [`QuestionSource`] trait, so questions
//! can equally come from a remote endpoint or an embedded bank.

use std::collections::HashMap;

use enum_map::Enum;
use garde::Validate;
use heck::ToTitleCase;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::question::{MAX_CHOICES, MAX_TEXT_LENGTH, MIN_CHOICES};

/// How hard a question is, serialized as its level (1 to 3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    /// Level 1
    Easy,
    /// Level 2
    Medium,
    /// Level 3
    Hard,
}

/// Error for difficulty levels outside of 1 to 3
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("difficulty {0} is outside of the bounds [1,3]")]
pub struct InvalidDifficulty(pub u8);

impl TryFrom<u8> for Difficulty {
    type Error = InvalidDifficulty;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Easy),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Hard),
            _ => Err(InvalidDifficulty(value)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(value: Difficulty) -> Self {
        value.level()
    }
}

impl Difficulty {
    /// Returns the level, starting at 1 for [`Difficulty::Easy`]
    pub fn level(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }

    /// Returns a label for display
    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

/// Validates that the correct answer points at one of the choices
fn validate_correct(choices: &[String]) -> impl FnOnce(&usize, &()) -> garde::Result + '_ {
    move |correct, _| {
        if *correct < choices.len() {
            Ok(())
        } else {
            Err(garde::Error::new(format!(
                "correct answer {correct} is not one of the {} choices",
                choices.len()
            )))
        }
    }
}

/// A multiple choice question with its solution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Identifier within its category
    #[garde(skip)]
    pub id: u32,
    /// The question text
    #[garde(length(min = 1, max = MAX_TEXT_LENGTH))]
    pub question: String,
    /// The answer choices, in display order
    #[garde(
        length(min = MIN_CHOICES, max = MAX_CHOICES),
        inner(length(min = 1, max = MAX_TEXT_LENGTH))
    )]
    pub choices: Vec<String>,
    /// Index of the correct choice
    #[garde(custom(validate_correct(&self.choices)))]
    pub correct: usize,
    /// How hard the question is
    #[garde(skip)]
    pub difficulty: Difficulty,
    /// Shown once the question has been answered
    #[garde(length(max = MAX_TEXT_LENGTH))]
    #[serde(default)]
    pub explanation: String,
}

/// What players see of a question while it can still be answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPrompt {
    /// Identifier within its category
    pub id: u32,
    /// The question text
    pub question: String,
    /// The answer choices, in display order
    pub choices: Vec<String>,
    /// How hard the question is
    pub difficulty: Difficulty,
}

impl Question {
    /// Returns whether `choice` is the correct answer
    pub fn is_correct(&self, choice: usize) -> bool {
        self.correct == choice
    }

    /// Returns the question without its solution
    pub fn prompt(&self) -> QuestionPrompt {
        QuestionPrompt {
            id: self.id,
            question: self.question.clone(),
            choices: self.choices.clone(),
            difficulty: self.difficulty,
        }
    }
}

/// Static description of a built-in category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    /// Identifier used in requests and stored records
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Emoji shown next to the name
    pub icon: &'static str,
    /// Short description
    pub description: &'static str,
}

/// The built-in categories
pub const CATEGORIES: &[CategoryInfo] = &[
    CategoryInfo {
        id: "maths",
        name: "Mathematics",
        icon: "🔢",
        description: "Arithmetic and mental calculation",
    },
    CategoryInfo {
        id: "geo_madagascar",
        name: "Madagascar Geography",
        icon: "🇲🇬",
        description: "Regions, cities and landscapes of Madagascar",
    },
    CategoryInfo {
        id: "geo_afrique",
        name: "African Geography",
        icon: "🌍",
        description: "Countries, capitals and rivers of Africa",
    },
    CategoryInfo {
        id: "culture_generale",
        name: "General Knowledge",
        icon: "📚",
        description: "A bit of everything",
    },
    CategoryInfo {
        id: "python",
        name: "Python",
        icon: "🐍",
        description: "The Python programming language",
    },
];

/// Returns the built-in description of a category
pub fn category(id: &str) -> Option<&'static CategoryInfo> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// Returns the display name of a category
///
/// Unknown identifiers are title-cased, so `space_travel` becomes
/// `Space Travel`.
pub fn display_name(id: &str) -> String {
    category(id).map_or_else(|| id.to_title_case(), |c| c.name.to_owned())
}

/// A category together with the number of questions available in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    /// Identifier used in requests and stored records
    pub id: String,
    /// Display name
    pub name: String,
    /// Emoji shown next to the name
    pub icon: String,
    /// Short description
    pub description: String,
    /// Number of questions available
    pub count: usize,
}

/// Errors that can occur when loading or fetching questions
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested category does not exist
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    /// The question data is not valid JSON of the expected shape
    #[error("malformed question data: {0}")]
    Malformed(String),
    /// A question failed validation
    #[error("question {id} of {category} is invalid: {reason}")]
    Invalid {
        /// Category of the question
        category: String,
        /// Identifier of the question
        id: u32,
        /// Validation report
        reason: String,
    },
    /// The questions could not be retrieved
    #[error("questions are unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can provide the questions of a category
pub trait QuestionSource {
    /// Fetches every question of a category
    ///
    /// # Errors
    ///
    /// Returns `Error::CategoryNotFound` for unknown categories, or another
    /// error if the questions could not be retrieved.
    fn fetch(&self, category: &str) -> Result<Vec<Question>, Error>;
}

/// Questions grouped by category, kept in memory
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    categories: HashMap<String, Vec<Question>>,
}

impl QuestionBank {
    /// Parses and validates a question bank from JSON
    ///
    /// The expected shape is an object mapping category identifiers to
    /// arrays of questions.
    ///
    /// # Errors
    ///
    /// * `Error::Malformed` - the input is not a JSON object of question arrays
    /// * `Error::Invalid` - one of the questions failed validation
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let bank: Self = serde_json::from_str(json).map_err(|e| Error::Malformed(e.to_string()))?;
        bank.validate_all()?;
        Ok(bank)
    }

    /// Adds questions to a category, replacing what it held before
    ///
    /// # Errors
    ///
    /// Returns `Error::Invalid` if one of the questions failed validation;
    /// the bank is left unchanged in that case.
    pub fn insert(&mut self, category: &str, questions: Vec<Question>) -> Result<(), Error> {
        validate_questions(category, &questions)?;
        self.categories.insert(category.to_owned(), questions);
        Ok(())
    }

    fn validate_all(&self) -> Result<(), Error> {
        self.categories
            .iter()
            .try_for_each(|(category, questions)| validate_questions(category, questions))
    }

    /// Lists the built-in categories followed by any other loaded category,
    /// each with its question count
    pub fn categories(&self) -> Vec<CategorySummary> {
        let builtin = CATEGORIES.iter().map(|c| CategorySummary {
            id: c.id.to_owned(),
            name: c.name.to_owned(),
            icon: c.icon.to_owned(),
            description: c.description.to_owned(),
            count: self.count(c.id),
        });

        let extra = self
            .categories
            .keys()
            .filter(|id| category(id).is_none())
            .sorted()
            .map(|id| CategorySummary {
                id: id.clone(),
                name: display_name(id),
                icon: String::new(),
                description: String::new(),
                count: self.count(id),
            });

        builtin.chain(extra).collect_vec()
    }

    /// Returns the number of questions in a category
    pub fn count(&self, category: &str) -> usize {
        self.categories.get(category).map_or(0, Vec::len)
    }
}

fn validate_questions(category: &str, questions: &[Question]) -> Result<(), Error> {
    questions.iter().try_for_each(|q| {
        q.validate().map_err(|report| Error::Invalid {
            category: category.to_owned(),
            id: q.id,
            reason: report.to_string(),
        })
    })
}

impl QuestionSource for QuestionBank {
    fn fetch(&self, category: &str) -> Result<Vec<Question>, Error> {
        self.categories
            .get(category)
            .cloned()
            .ok_or_else(|| Error::CategoryNotFound(category.to_owned()))
    }
}

/// Shuffles questions and keeps at most `limit` of them
pub fn draw(mut questions: Vec<Question>, limit: usize, rng: &mut fastrand::Rng) -> Vec<Question> {
    rng.shuffle(&mut questions);
    questions.truncate(limit);
    questions
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn question(id: u32, correct: usize, difficulty: Difficulty) -> Question {
        Question {
            id,
            question: format!("Question {id}?"),
            choices: vec![
                "Alpha".to_owned(),
                "Bravo".to_owned(),
                "Charlie".to_owned(),
                "Delta".to_owned(),
            ],
            correct,
            difficulty,
            explanation: format!("Explanation {id}"),
        }
    }

    const BANK: &str = r#"{
        "maths": [
            {"id": 1, "question": "2 + 2?", "choices": ["3", "4"], "correct": 1, "difficulty": 1, "explanation": "Basic addition"},
            {"id": 2, "question": "7 x 8?", "choices": ["54", "56", "58"], "correct": 1, "difficulty": 2, "explanation": "Times tables"}
        ],
        "space_travel": [
            {"id": 1, "question": "First human in space?", "choices": ["Gagarin", "Armstrong"], "correct": 0, "difficulty": 3}
        ]
    }"#;

    #[test]
    fn test_difficulty_serialization() {
        assert_eq!(serde_json::to_string(&Difficulty::Medium).unwrap(), "2");
        assert_eq!(
            serde_json::from_str::<Difficulty>("3").unwrap(),
            Difficulty::Hard
        );
        assert!(serde_json::from_str::<Difficulty>("0").is_err());
        assert!(serde_json::from_str::<Difficulty>("4").is_err());
    }

    #[test]
    fn test_question_validation() {
        assert!(question(1, 0, Difficulty::Easy).validate().is_ok());
    }

    #[test]
    fn test_question_correct_out_of_range() {
        assert!(question(1, 4, Difficulty::Easy).validate().is_err());
    }

    #[test]
    fn test_question_too_few_choices() {
        let mut q = question(1, 0, Difficulty::Easy);
        q.choices.truncate(1);
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_question_empty_choice() {
        let mut q = question(1, 0, Difficulty::Easy);
        q.choices[2] = String::new();
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_question_prompt_hides_solution() {
        let q = question(7, 2, Difficulty::Hard);
        let prompt = q.prompt();
        assert_eq!(prompt.id, 7);
        assert_eq!(prompt.choices, q.choices);

        let json = serde_json::to_string(&prompt).unwrap();
        assert!(!json.contains("correct"));
        assert!(!json.contains("explanation"));
    }

    #[test]
    fn test_question_is_correct() {
        let q = question(1, 2, Difficulty::Easy);
        assert!(q.is_correct(2));
        assert!(!q.is_correct(0));
    }

    #[test]
    fn test_bank_from_json_and_fetch() {
        let bank = QuestionBank::from_json(BANK).unwrap();
        let maths = bank.fetch("maths").unwrap();
        assert_eq!(maths.len(), 2);
        assert_eq!(maths[1].difficulty, Difficulty::Medium);

        let space = bank.fetch("space_travel").unwrap();
        assert_eq!(space[0].explanation, "");
    }

    #[test]
    fn test_bank_unknown_category() {
        let bank = QuestionBank::from_json(BANK).unwrap();
        assert_eq!(
            bank.fetch("python"),
            Err(Error::CategoryNotFound("python".to_owned()))
        );
    }

    #[test]
    fn test_bank_malformed() {
        assert!(matches!(
            QuestionBank::from_json("[1, 2]"),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_bank_invalid_question() {
        let json = r#"{"maths": [{"id": 9, "question": "?", "choices": ["a", "b"], "correct": 5, "difficulty": 1}]}"#;
        assert!(matches!(
            QuestionBank::from_json(json),
            Err(Error::Invalid { id: 9, .. })
        ));
    }

    #[test]
    fn test_bank_insert_rejects_invalid() {
        let mut bank = QuestionBank::default();
        assert!(
            bank.insert("maths", vec![question(1, 9, Difficulty::Easy)])
                .is_err()
        );
        assert_eq!(bank.count("maths"), 0);

        bank.insert("maths", vec![question(1, 0, Difficulty::Easy)])
            .unwrap();
        assert_eq!(bank.count("maths"), 1);
    }

    #[test]
    fn test_bank_categories() {
        let bank = QuestionBank::from_json(BANK).unwrap();
        let categories = bank.categories();

        assert_eq!(categories.len(), CATEGORIES.len() + 1);
        assert_eq!(categories[0].id, "maths");
        assert_eq!(categories[0].count, 2);
        assert_eq!(categories[4].id, "python");
        assert_eq!(categories[4].count, 0);
        assert_eq!(categories[5].name, "Space Travel");
        assert_eq!(categories[5].count, 1);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("geo_afrique"), "African Geography");
        assert_eq!(display_name("world_history"), "World History");
    }

    #[test]
    fn test_draw_limits_and_keeps_questions() {
        let questions = (0..10)
            .map(|i| question(i, 0, Difficulty::Easy))
            .collect_vec();
        let mut rng = fastrand::Rng::with_seed(7);

        let drawn = draw(questions.clone(), 4, &mut rng);
        assert_eq!(drawn.len(), 4);
        assert!(drawn.iter().all(|q| questions.contains(q)));
        assert_eq!(drawn.iter().map(|q| q.id).unique().count(), 4);

        let all = draw(questions, 40, &mut rng);
        assert_eq!(all.len(), 10);
    }
}
