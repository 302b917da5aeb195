//! Multiple choice question implementation
//!
//! Each question carries exactly one correct option index. A player either
//! selects one option per question or leaves it unanswered; no selection
//! counts as incorrect.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::{Grade, ReviewItem};

/// Content of a multiple choice test
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// The questions, in presentation order
    #[garde(length(max = crate::constants::content::MAX_QUESTION_COUNT), dive)]
    pub questions: Vec<Question>,
}

/// One multiple choice question
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Question {
    /// The question text
    #[garde(length(max = crate::constants::content::MAX_QUESTION_LENGTH))]
    pub question: String,
    /// The selectable options
    #[garde(length(min = 2, max = crate::constants::content::MAX_OPTION_COUNT))]
    pub options: Vec<String>,
    /// Index of the correct option
    #[garde(skip)]
    pub answer: usize,
    /// Optional explanation shown in the review
    #[garde(skip)]
    pub explanation: Option<String>,
}

/// Grades selected option indices against the questions
///
/// A selection outside the option range grades as incorrect, the same as
/// no selection; the ground truth text falls back to empty when the
/// authored answer index is itself out of range.
pub fn grade(config: &Config, answers: &[Option<usize>]) -> Grade {
    let mut score = 0;
    let review = config
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let selected = answers.get(index).copied().flatten();
            let is_correct = selected == Some(question.answer);
            if is_correct {
                score += 1;
            }
            ReviewItem {
                prompt: question.question.clone(),
                user_answer: selected.and_then(|i| question.options.get(i).cloned()),
                correct_answers: question
                    .options
                    .get(question.answer)
                    .cloned()
                    .into_iter()
                    .collect(),
                is_correct,
                explanation: question.explanation.clone(),
            }
        })
        .collect();

    Grade {
        score,
        total: config.questions.len() as u32,
        review,
    }
}
