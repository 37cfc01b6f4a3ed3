use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{AnswerSet, Category, Question, QuestionId, TargetScores};
use super::engine::ScoringEngine;
use crate::error::AppError;

/// Question as shown to respondents; option scores stay server-side.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub category: Category,
    pub text: String,
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            category: question.category,
            text: question.text.clone(),
            options: question
                .options
                .iter()
                .map(|option| option.text.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub answers: AnswerSet,
}

pub fn assessment_router(engine: Arc<ScoringEngine>) -> Router {
    Router::new()
        .route("/api/v1/questionnaire", get(questionnaire_handler))
        .route("/api/v1/assessment/score", post(score_handler))
        .route("/api/v1/assessment/synthesize", post(synthesize_handler))
        .with_state(engine)
}

pub(crate) async fn questionnaire_handler(State(engine): State<Arc<ScoringEngine>>) -> Response {
    let questions: Vec<QuestionView> = engine
        .catalog()
        .questions()
        .iter()
        .map(QuestionView::from)
        .collect();
    (StatusCode::OK, axum::Json(json!({ "questions": questions }))).into_response()
}

pub(crate) async fn score_handler(
    State(engine): State<Arc<ScoringEngine>>,
    axum::Json(request): axum::Json<ScoreRequest>,
) -> Response {
    match engine.score(&request.answers) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn synthesize_handler(
    State(engine): State<Arc<ScoringEngine>>,
    axum::Json(targets): axum::Json<TargetScores>,
) -> Response {
    match engine.synthesize(&targets) {
        Ok(synthesis) => (StatusCode::OK, axum::Json(synthesis)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}
