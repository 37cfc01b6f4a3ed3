use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;

use super::CatalogError;
use crate::assessment::domain::{AnswerOption, Category, OptionScore, Question, QuestionId};

/// One option per row; rows of a question need not be adjacent.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    question_id: u32,
    category: String,
    question: String,
    option: String,
    score: i8,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    recommendation: String,
}

pub(super) fn parse_questions<R: Read>(reader: R) -> Result<Vec<Question>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut questions: Vec<Question> = Vec::new();
    let mut positions: HashMap<QuestionId, usize> = HashMap::new();

    for row in csv_reader.deserialize::<CatalogRow>() {
        let row = row?;
        let id = QuestionId(row.question_id);

        let category = Category::parse(&row.category).ok_or_else(|| {
            CatalogError::UnknownCategory {
                question: id,
                value: row.category.clone(),
            }
        })?;
        let score = OptionScore::try_from(row.score).map_err(|_| CatalogError::InvalidScore {
            question: id,
            value: row.score,
        })?;
        let option = AnswerOption {
            text: row.option,
            score,
            explanation: row.explanation,
            recommendation: row.recommendation,
        };

        match positions.get(&id).copied() {
            Some(position) => {
                let question = &mut questions[position];
                if question.category != category || question.text != row.question {
                    return Err(CatalogError::InconsistentQuestion(id));
                }
                question.options.push(option);
            }
            None => {
                positions.insert(id, questions.len());
                questions.push(Question {
                    id,
                    category,
                    text: row.question,
                    options: vec![option],
                });
            }
        }
    }

    Ok(questions)
}
