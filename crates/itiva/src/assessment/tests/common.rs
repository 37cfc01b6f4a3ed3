use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::assessment::catalog::Questionnaire;
use crate::assessment::domain::{
    AnswerOption, AnswerSet, Category, OptionScore, Question, QuestionId,
};
use crate::assessment::engine::ScoringEngine;

pub(super) fn standard_engine() -> ScoringEngine {
    ScoringEngine::standard().expect("embedded catalog loads")
}

pub(super) fn option(text: &str, score: i8) -> AnswerOption {
    AnswerOption {
        text: text.to_string(),
        score: OptionScore::try_from(score).expect("score in range"),
        explanation: format!("{text} explained"),
        recommendation: format!("improve from {text}"),
    }
}

pub(super) fn question(id: u32, category: Category, scores: &[i8]) -> Question {
    Question {
        id: QuestionId(id),
        category,
        text: format!("question {id}"),
        options: scores
            .iter()
            .enumerate()
            .map(|(position, score)| option(&format!("q{id}-o{position}"), *score))
            .collect(),
    }
}

/// Two Website Strength questions scored `[2, 1, 0, -1, -2]`; other categories empty.
pub(super) fn two_question_engine() -> ScoringEngine {
    engine_with(vec![
        question(1, Category::WebsiteStrength, &[2, 1, 0, -1, -2]),
        question(2, Category::WebsiteStrength, &[2, 1, 0, -1, -2]),
    ])
}

/// Worst option of each question is -1, so unanswered is strictly worse than answered.
pub(super) fn shallow_engine() -> ScoringEngine {
    engine_with(vec![
        question(1, Category::DevicesAndNetwork, &[2, 1, 0, -1]),
        question(2, Category::DevicesAndNetwork, &[-1, 0, 2, 1]),
    ])
}

pub(super) fn engine_with(questions: Vec<Question>) -> ScoringEngine {
    let catalog = Questionnaire::new(questions).expect("fixture catalog is valid");
    ScoringEngine::new(Arc::new(catalog))
}

pub(super) fn best_answers(engine: &ScoringEngine) -> AnswerSet {
    engine
        .catalog()
        .questions()
        .iter()
        .map(|question| {
            let index = question.best_option_index().expect("best option present");
            (question.id, index)
        })
        .collect()
}

/// Every question answered with the option at `position`.
pub(super) fn uniform_answers(engine: &ScoringEngine, position: usize) -> AnswerSet {
    engine
        .catalog()
        .questions()
        .iter()
        .map(|question| (question.id, position))
        .collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
