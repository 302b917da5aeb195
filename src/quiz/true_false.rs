//! True/false question implementation
//!
//! Each statement carries a boolean ground truth. The player's state per
//! statement is `Option<bool>`: `None` is a third "no answer" state,
//! distinct from `Some(false)`, and counts as incorrect.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::{Grade, ReviewItem};

/// Content of a true/false test
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// The statements, in presentation order
    #[garde(length(max = crate::constants::content::MAX_QUESTION_COUNT), dive)]
    pub questions: Vec<Statement>,
}

/// One statement to judge
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Statement {
    /// The statement text
    #[garde(length(max = crate::constants::content::MAX_QUESTION_LENGTH))]
    pub statement: String,
    /// Whether the statement is true
    #[garde(skip)]
    pub answer: bool,
    /// Optional explanation shown in the review
    #[garde(skip)]
    pub explanation: Option<String>,
}

fn label(value: bool) -> String {
    if value { "True" } else { "False" }.to_owned()
}

/// Grades judgements against the statements
pub fn grade(config: &Config, answers: &[Option<bool>]) -> Grade {
    let mut score = 0;
    let review = config
        .questions
        .iter()
        .enumerate()
        .map(|(index, statement)| {
            let judgement = answers.get(index).copied().flatten();
            let is_correct = judgement == Some(statement.answer);
            if is_correct {
                score += 1;
            }
            ReviewItem {
                prompt: statement.statement.clone(),
                user_answer: judgement.map(label),
                correct_answers: vec![label(statement.answer)],
                is_correct,
                explanation: statement.explanation.clone(),
            }
        })
        .collect();

    Grade {
        score,
        total: config.questions.len() as u32,
        review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            questions: vec![
                Statement {
                    statement: "The sun is a star.".to_owned(),
                    answer: true,
                    explanation: None,
                },
                Statement {
                    statement: "Spiders are insects.".to_owned(),
                    answer: false,
                    explanation: Some("Spiders are arachnids.".to_owned()),
                },
            ],
        }
    }

    #[test]
    fn test_judgements_graded() {
        let grade = grade(&config(), &[Some(true), Some(false)]);
        assert_eq!(grade.score, 2);
        assert_eq!(grade.total, 2);
    }

    #[test]
    fn test_no_answer_distinct_from_false() {
        // First statement is true: both None and Some(false) are incorrect,
        // but they are different user answers in the review.
        let unanswered = grade(&config(), &[None, None]);
        assert_eq!(unanswered.score, 0);
        assert!(unanswered.review[0].user_answer.is_none());

        let wrong = grade(&config(), &[Some(false), None]);
        assert_eq!(wrong.score, 0);
        assert_eq!(wrong.review[0].user_answer.as_deref(), Some("False"));
    }

    #[test]
    fn test_review_labels_and_explanation() {
        let grade = grade(&config(), &[Some(false), Some(true)]);
        assert_eq!(grade.score, 0);
        assert_eq!(grade.review[0].correct_answers, vec!["True".to_owned()]);
        assert_eq!(grade.review[1].correct_answers, vec!["False".to_owned()]);
        assert_eq!(
            grade.review[1].explanation.as_deref(),
            Some("Spiders are arachnids.")
        );
    }
}
