use super::domain::{Category, QuestionId};

/// Validation failure for engine input. The engine never partially applies input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssessmentError {
    #[error("question {0} is not part of the questionnaire")]
    UnknownQuestion(QuestionId),
    #[error("question {question} has no option at position {index} ({available} available)")]
    UnknownOption {
        question: QuestionId,
        index: usize,
        available: usize,
    },
    #[error("target score {value} for {category} is outside 0..=100")]
    TargetOutOfRange { category: Category, value: i32 },
}
