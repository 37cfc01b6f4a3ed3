//! Questionnaire catalog, scoring engine, and synthetic answer generation.

pub mod catalog;
pub mod domain;
pub mod engine;
pub mod error;
pub mod router;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, Questionnaire};
pub use domain::{
    AnswerOption, AnswerSet, AssessmentReport, Category, CategoryScores, OptionIndex, OptionScore,
    Question, QuestionId, Recommendation, ScoreOutOfRange, Synthesis, TargetScores,
    CATEGORY_COUNT,
};
pub use engine::{round_points, ScoringEngine};
pub use error::AssessmentError;
pub use router::assessment_router;
