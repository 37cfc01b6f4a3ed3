use super::common::*;
use crate::assessment::domain::{AnswerSet, Category, QuestionId};
use crate::assessment::error::AssessmentError;

#[test]
fn best_answers_score_one_hundred_without_recommendations() {
    let engine = standard_engine();

    let report = engine.score(&best_answers(&engine)).expect("valid answers");

    for category in Category::ordered() {
        assert_eq!(report.scores.get(category), 100, "{category}");
    }
    assert_eq!(report.overall, 100);
    assert!(report.recommendations.is_empty());
}

#[test]
fn second_options_land_at_three_quarters() {
    let engine = standard_engine();

    let report = engine
        .score(&uniform_answers(&engine, 1))
        .expect("valid answers");

    assert_eq!(report.scores.ws, 75);
    assert_eq!(report.scores.dn, 75);
    assert_eq!(report.scores.cd, 75);
    assert_eq!(report.scores.cs, 75);
    assert_eq!(report.overall, 75);
    assert_eq!(report.recommendations.len(), 30);
}

#[test]
fn last_options_follow_per_question_scores() {
    let engine = standard_engine();

    let report = engine
        .score(&uniform_answers(&engine, 4))
        .expect("valid answers");

    assert_eq!(report.scores.ws, 3);
    assert_eq!(report.scores.dn, 18);
    assert_eq!(report.scores.cd, 13);
    assert_eq!(report.scores.cs, 11);
    assert_eq!(report.overall, 11);
}

#[test]
fn impact_reflects_recoverable_points() {
    let engine = two_question_engine();
    let answers = AnswerSet::new()
        .with(QuestionId(1), 1)
        .with(QuestionId(2), 4);

    let report = engine.score(&answers).expect("valid answers");

    // 50 points per question: score 1 keeps 37.5, score -2 keeps nothing.
    assert_eq!(report.scores.ws, 38);
    assert_eq!(report.overall, 10);
    let impacts: Vec<(QuestionId, u8)> = report
        .recommendations
        .iter()
        .map(|rec| (rec.question_id, rec.impact_score))
        .collect();
    assert_eq!(impacts, vec![(QuestionId(2), 50), (QuestionId(1), 13)]);
    assert_eq!(report.recommendations[1].text, "improve from q1-o1");
}

#[test]
fn equal_impacts_are_ordered_by_question_id() {
    let engine = standard_engine();

    let report = engine
        .score(&uniform_answers(&engine, 1))
        .expect("valid answers");

    let leading: Vec<u32> = report
        .recommendations
        .iter()
        .take(3)
        .map(|rec| rec.question_id.0)
        .collect();
    assert_eq!(leading, vec![9, 10, 11]);
    assert!(report
        .recommendations
        .windows(2)
        .all(|pair| pair[0].impact_score > pair[1].impact_score
            || (pair[0].impact_score == pair[1].impact_score
                && pair[0].question_id < pair[1].question_id)));
}

#[test]
fn empty_categories_score_zero_and_still_count_toward_overall() {
    let engine = two_question_engine();

    let report = engine.score(&best_answers(&engine)).expect("valid answers");

    assert_eq!(report.scores.ws, 100);
    assert_eq!(report.scores.dn, 0);
    assert_eq!(report.scores.cd, 0);
    assert_eq!(report.scores.cs, 0);
    assert_eq!(report.overall, 25);
}

#[test]
fn rejects_unknown_question() {
    let engine = standard_engine();
    let answers = AnswerSet::new().with(QuestionId(31), 0);

    assert_eq!(
        engine.score(&answers),
        Err(AssessmentError::UnknownQuestion(QuestionId(31)))
    );
}

#[test]
fn rejects_option_position_past_the_end() {
    let engine = standard_engine();
    let answers = AnswerSet::new().with(QuestionId(1), 0).with(QuestionId(2), 5);

    assert_eq!(
        engine.score(&answers),
        Err(AssessmentError::UnknownOption {
            question: QuestionId(2),
            index: 5,
            available: 5,
        })
    );
}

#[test]
fn report_serializes_flat_with_camel_case_recommendations() {
    let engine = two_question_engine();
    let answers = AnswerSet::new().with(QuestionId(1), 2);

    let report = engine.score(&answers).expect("valid answers");
    let json = serde_json::to_value(&report).expect("serializes");

    assert_eq!(json["ws"], 25);
    assert_eq!(json["overall"], 6);
    assert_eq!(json["recommendations"][0]["impactScore"], 25);
    assert_eq!(json["recommendations"][0]["questionId"], 1);
    assert_eq!(json["recommendations"][0]["category"], "Website Strength");
}
