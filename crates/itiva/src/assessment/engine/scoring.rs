use crate::assessment::catalog::Questionnaire;
use crate::assessment::domain::{
    AnswerSet, AssessmentReport, Category, CategoryScores, Recommendation, CATEGORY_COUNT,
};

/// Round half away from zero and clamp into `0..=100`.
pub fn round_points(points: f64) -> u8 {
    points.round().clamp(0.0, 100.0) as u8
}

/// Points each question of a category is worth. Unanswered questions still count.
pub(super) fn max_points_per_question(question_count: usize) -> f64 {
    100.0 / question_count as f64
}

/// Assumes the answers were validated against `catalog`; unknown entries are ignored.
pub(super) fn score_answers(catalog: &Questionnaire, answers: &AnswerSet) -> AssessmentReport {
    let mut scores = CategoryScores::default();
    let mut recommendations = Vec::new();

    for category in Category::ordered() {
        let questions = catalog.questions_in(category);
        if questions.is_empty() {
            continue;
        }

        let max_points = max_points_per_question(questions.len());
        let mut category_sum = 0.0;

        for question in questions {
            let Some(option) = answers
                .get(question.id)
                .and_then(|index| question.option(index))
            else {
                continue;
            };

            let question_score = option.score.normalized() * max_points;
            category_sum += question_score;

            if !option.score.is_best() {
                recommendations.push(Recommendation {
                    text: option.recommendation.clone(),
                    impact_score: round_points(max_points - question_score),
                    category,
                    question_id: question.id,
                });
            }
        }

        scores.set(category, round_points(category_sum));
    }

    recommendations.sort_by(|a, b| {
        b.impact_score
            .cmp(&a.impact_score)
            .then_with(|| a.question_id.cmp(&b.question_id))
    });

    AssessmentReport {
        scores,
        overall: round_points(f64::from(scores.total()) / CATEGORY_COUNT as f64),
        recommendations,
    }
}
