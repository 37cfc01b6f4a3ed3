use crate::assessment::catalog::Questionnaire;
use crate::assessment::domain::{AnswerSet, Category, OptionScore, TargetScores};

use super::scoring::max_points_per_question;

/// Greedy, single pass per category. Starts from all-best answers and degrades
/// questions in catalog order while the remaining deficit allows it.
///
/// Each question takes the deepest option that still fits the deficit rather
/// than the mildest one; mildest-first cannot reach low targets such as 0.
pub(super) fn synthesize_answers(catalog: &Questionnaire, targets: &TargetScores) -> AnswerSet {
    let mut answers: AnswerSet = catalog
        .questions()
        .iter()
        .filter_map(|question| {
            question
                .best_option_index()
                .map(|index| (question.id, index))
        })
        .collect();

    for category in Category::ordered() {
        let questions = catalog.questions_in(category);
        if questions.is_empty() {
            continue;
        }

        let max_points = max_points_per_question(questions.len());
        let mut deficit = f64::from(100 - targets.get(category));

        for question in questions {
            if deficit <= 0.0 {
                break;
            }

            let ranked = question.ranked_options();
            let Some((_, perfect)) = ranked.first() else {
                continue;
            };

            // Deepest degradation that still fits the deficit; ranked order means
            // the first option that overshoots ends the scan.
            let mut chosen: Option<(usize, OptionScore, f64)> = None;
            for (index, candidate) in ranked.iter().skip(1) {
                let lost = points_lost(perfect.score, candidate.score, max_points);
                if lost > deficit {
                    break;
                }
                if candidate.score == perfect.score {
                    continue;
                }
                let deeper = chosen
                    .map(|(_, score, _)| candidate.score < score)
                    .unwrap_or(true);
                if deeper {
                    chosen = Some((*index, candidate.score, lost));
                }
            }

            if let Some((index, _, lost)) = chosen {
                answers.select(question.id, index);
                deficit -= lost;
            }
        }
    }

    answers
}

fn points_lost(perfect: OptionScore, candidate: OptionScore, max_points: f64) -> f64 {
    f64::from(perfect.value() - candidate.value()) / 4.0 * max_points
}
