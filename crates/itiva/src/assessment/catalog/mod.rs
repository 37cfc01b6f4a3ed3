mod csv_import;

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{Category, Question, QuestionId};

const STANDARD_CATALOG: &str = include_str!("../../../data/questionnaire.json");

pub const MIN_OPTIONS_PER_QUESTION: usize = 4;
pub const MAX_OPTIONS_PER_QUESTION: usize = 5;

/// Error raised while loading or validating a questionnaire catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read questionnaire: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid questionnaire JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid questionnaire CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("questionnaire contains no questions")]
    Empty,
    #[error("question {0} appears more than once")]
    DuplicateQuestion(QuestionId),
    #[error("question {question} has {count} options, expected 4 or 5")]
    OptionCount { question: QuestionId, count: usize },
    #[error("question {0} has no option scored 2")]
    MissingBestOption(QuestionId),
    #[error("question {question} uses unknown category '{value}'")]
    UnknownCategory { question: QuestionId, value: String },
    #[error("question {question} has option score {value} outside [-2, 2]")]
    InvalidScore { question: QuestionId, value: i8 },
    #[error("question {0} has conflicting text or category across rows")]
    InconsistentQuestion(QuestionId),
}

#[derive(Debug, Serialize, Deserialize)]
struct CatalogDocument {
    questions: Vec<Question>,
}

/// Immutable, validated questionnaire. Question order is catalog order.
#[derive(Debug, Clone)]
pub struct Questionnaire {
    questions: Vec<Question>,
    positions: HashMap<QuestionId, usize>,
}

impl Questionnaire {
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id) {
                return Err(CatalogError::DuplicateQuestion(question.id));
            }

            let count = question.options.len();
            if !(MIN_OPTIONS_PER_QUESTION..=MAX_OPTIONS_PER_QUESTION).contains(&count) {
                return Err(CatalogError::OptionCount {
                    question: question.id,
                    count,
                });
            }

            if question.best_option_index().is_none() {
                return Err(CatalogError::MissingBestOption(question.id));
            }
        }

        let positions = questions
            .iter()
            .enumerate()
            .map(|(position, question)| (question.id, position))
            .collect();

        Ok(Self {
            questions,
            positions,
        })
    }

    /// The questionnaire bundled with the crate.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_json_str(STANDARD_CATALOG)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(raw)?;
        Self::new(document.questions)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_reader(reader)?;
        Self::new(document.questions)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        Self::new(csv_import::parse_questions(reader)?)
    }

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Load from disk, choosing the CSV reader for `.csv` files and JSON otherwise.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        let catalog = if is_csv {
            Self::from_csv_path(path)?
        } else {
            Self::from_json_path(path)?
        };

        debug!(path = %path.display(), questions = catalog.len(), "questionnaire loaded");
        Ok(catalog)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.positions
            .get(&id)
            .and_then(|position| self.questions.get(*position))
    }

    pub fn questions_in(&self, category: Category) -> Vec<&Question> {
        self.questions
            .iter()
            .filter(|question| question.category == category)
            .collect()
    }

    pub fn count_in(&self, category: Category) -> usize {
        self.questions
            .iter()
            .filter(|question| question.category == category)
            .count()
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        let document = CatalogDocument {
            questions: self.questions.clone(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}
