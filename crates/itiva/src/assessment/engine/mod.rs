mod scoring;
mod synthesis;

pub use scoring::round_points;

use std::sync::Arc;

use tracing::debug;

use super::catalog::{CatalogError, Questionnaire};
use super::domain::{AnswerSet, AssessmentReport, Category, Synthesis, TargetScores};
use super::error::AssessmentError;

/// Stateless scorer bound to one questionnaire. Safe to share across requests.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: Arc<Questionnaire>,
}

impl ScoringEngine {
    pub fn new(catalog: Arc<Questionnaire>) -> Self {
        Self { catalog }
    }

    /// Engine over the embedded questionnaire.
    pub fn standard() -> Result<Self, CatalogError> {
        Ok(Self::new(Arc::new(Questionnaire::standard()?)))
    }

    pub fn catalog(&self) -> &Questionnaire {
        &self.catalog
    }

    /// Reject answers naming unknown questions or option positions. Partial sets are fine.
    pub fn validate_answers(&self, answers: &AnswerSet) -> Result<(), AssessmentError> {
        for (question_id, index) in answers.iter() {
            let question = self
                .catalog
                .question(question_id)
                .ok_or(AssessmentError::UnknownQuestion(question_id))?;

            if question.option(index).is_none() {
                return Err(AssessmentError::UnknownOption {
                    question: question_id,
                    index,
                    available: question.options.len(),
                });
            }
        }
        Ok(())
    }

    pub fn score(&self, answers: &AnswerSet) -> Result<AssessmentReport, AssessmentError> {
        self.validate_answers(answers)?;
        let report = scoring::score_answers(&self.catalog, answers);
        debug!(
            answered = answers.len(),
            overall = report.overall,
            recommendations = report.recommendations.len(),
            "assessment scored"
        );
        Ok(report)
    }

    /// Build a plausible answer set for the targets and score it.
    pub fn synthesize(&self, targets: &TargetScores) -> Result<Synthesis, AssessmentError> {
        validate_targets(targets)?;
        let answers = synthesis::synthesize_answers(&self.catalog, targets);
        let report = scoring::score_answers(&self.catalog, &answers);
        debug!(
            ws = report.scores.ws,
            dn = report.scores.dn,
            cd = report.scores.cd,
            cs = report.scores.cs,
            "answers synthesized"
        );
        Ok(Synthesis { answers, report })
    }
}

fn validate_targets(targets: &TargetScores) -> Result<(), AssessmentError> {
    for category in Category::ordered() {
        let value = targets.get(category);
        if !(0..=100).contains(&value) {
            return Err(AssessmentError::TargetOutOfRange { category, value });
        }
    }
    Ok(())
}
