//! Test content model and grading
//!
//! This module defines the immutable test content a round references: a
//! tagged union over the three question kinds, the player's in-memory
//! answer state, and the pure grading entry point that produces a score
//! and a structured per-item review.
//!
//! Grading never mutates ground truth and never fails: an unanswered item,
//! an out-of-range selection, or even an answer sheet of the wrong kind all
//! grade as incorrect rather than erroring.

pub mod fill_in;
pub mod multiple_choice;
pub mod true_false;

use std::collections::HashMap;

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// A complete test as loaded from the content bank
///
/// Immutable once loaded; the synchronizer caches tests for the process
/// lifetime keyed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Test {
    /// Content identifier referenced by rounds
    #[garde(length(min = 1))]
    pub id: String,
    /// Display title
    #[garde(length(max = crate::constants::content::MAX_TITLE_LENGTH))]
    pub title: String,
    /// The question-kind specific content
    #[serde(flatten)]
    #[garde(dive)]
    pub kind: Kind,
}

/// The three supported question kinds
///
/// The serde tag matches the authoring format of the content bank.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Kind {
    /// A passage with blanks, each accepting one or more answers
    FillIn(#[garde(dive)] fill_in::Config),
    /// Questions with exactly one correct option index each
    MultipleChoice(#[garde(dive)] multiple_choice::Config),
    /// Statements with a boolean ground truth each
    TrueFalse(#[garde(dive)] true_false::Config),
}

/// The player's current answer state, one variant per question kind
///
/// Every slot is optional: "no answer" is always a valid input and grades
/// as incorrect, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerSheet {
    /// One optional text answer per blank
    FillIn(Vec<Option<String>>),
    /// One optional selected option index per question
    MultipleChoice(Vec<Option<usize>>),
    /// One optional judgement per statement; `None` is distinct from `Some(false)`
    TrueFalse(Vec<Option<bool>>),
}

/// A single answer action from the presentation layer
#[derive(Debug, Clone, Deserialize)]
pub enum Answer {
    /// Text chosen (or cleared) for a fill-in blank
    Blank {
        /// Index of the blank within the passage
        index: usize,
        /// Selected value, `None` to clear
        value: Option<String>,
    },
    /// Option selected for a multiple choice question
    Choice {
        /// Index of the question
        question: usize,
        /// Index of the selected option
        option: usize,
    },
    /// True/false judgement for a statement
    Judgement {
        /// Index of the statement
        question: usize,
        /// The player's judgement
        value: bool,
    },
}

impl AnswerSheet {
    /// Records an answer action, ignoring kind mismatches and
    /// out-of-range indices
    pub fn record(&mut self, answer: Answer) {
        match (self, answer) {
            (Self::FillIn(slots), Answer::Blank { index, value }) => {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = value;
                }
            }
            (Self::MultipleChoice(slots), Answer::Choice { question, option }) => {
                if let Some(slot) = slots.get_mut(question) {
                    *slot = Some(option);
                }
            }
            (Self::TrueFalse(slots), Answer::Judgement { question, value }) => {
                if let Some(slot) = slots.get_mut(question) {
                    *slot = Some(value);
                }
            }
            _ => (),
        }
    }

    /// Number of answered items
    pub fn answered(&self) -> usize {
        match self {
            Self::FillIn(slots) => slots.iter().filter(|s| s.is_some()).count(),
            Self::MultipleChoice(slots) => slots.iter().filter(|s| s.is_some()).count(),
            Self::TrueFalse(slots) => slots.iter().filter(|s| s.is_some()).count(),
        }
    }

    /// Number of items the sheet has room for
    pub fn len(&self) -> usize {
        match self {
            Self::FillIn(slots) => slots.len(),
            Self::MultipleChoice(slots) => slots.len(),
            Self::TrueFalse(slots) => slots.len(),
        }
    }

    /// Whether the sheet has no items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The outcome of grading one answer sheet against one test
#[derive(Debug, Clone, Serialize)]
pub struct Grade {
    /// Count of correct items
    pub score: u32,
    /// Count of gradable items
    pub total: u32,
    /// One record per item, preserving question order
    pub review: Vec<ReviewItem>,
}

impl Grade {
    /// Score as a whole percentage, zero for an empty test
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            (f64::from(self.score) * 100.0 / f64::from(self.total)).round() as u32
        }
    }
}

/// One review record produced by grading
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct ReviewItem {
    /// The question, statement, or blank position this record reviews
    pub prompt: String,
    /// The player's answer; `None` means no answer was given
    pub user_answer: Option<String>,
    /// The acceptable answer(s), rendered as text
    pub correct_answers: Vec<String>,
    /// Whether the player's answer was correct
    pub is_correct: bool,
    /// Optional explanation from the content author
    pub explanation: Option<String>,
}

impl Test {
    /// Count of gradable items in this test
    pub fn total(&self) -> usize {
        match &self.kind {
            Kind::FillIn(config) => config.blanks.len(),
            Kind::MultipleChoice(config) => config.questions.len(),
            Kind::TrueFalse(config) => config.questions.len(),
        }
    }

    /// Creates an empty answer sheet of the matching kind
    pub fn blank_sheet(&self) -> AnswerSheet {
        match &self.kind {
            Kind::FillIn(config) => AnswerSheet::FillIn(vec![None; config.blanks.len()]),
            Kind::MultipleChoice(config) => {
                AnswerSheet::MultipleChoice(vec![None; config.questions.len()])
            }
            Kind::TrueFalse(config) => AnswerSheet::TrueFalse(vec![None; config.questions.len()]),
        }
    }

    /// Grades an answer sheet against this test
    ///
    /// Pure: no side effects, ground truth untouched. A sheet of the wrong
    /// kind grades as fully unanswered rather than erroring.
    pub fn grade(&self, sheet: &AnswerSheet) -> Grade {
        match (&self.kind, sheet) {
            (Kind::FillIn(config), AnswerSheet::FillIn(answers)) => fill_in::grade(config, answers),
            (Kind::MultipleChoice(config), AnswerSheet::MultipleChoice(answers)) => {
                multiple_choice::grade(config, answers)
            }
            (Kind::TrueFalse(config), AnswerSheet::TrueFalse(answers)) => {
                true_false::grade(config, answers)
            }
            // Mismatched sheet kind: every item counts as unanswered.
            (Kind::FillIn(config), _) => fill_in::grade(config, &[]),
            (Kind::MultipleChoice(config), _) => multiple_choice::grade(config, &[]),
            (Kind::TrueFalse(config), _) => true_false::grade(config, &[]),
        }
    }
}

/// The process-lifetime cache of loaded tests, keyed by test id
#[derive(Debug, Default)]
pub struct TestBank {
    tests: HashMap<String, Test>,
}

impl TestBank {
    /// Builds a bank from loaded content, dropping tests that fail validation
    pub fn new(tests: Vec<Test>) -> Self {
        let tests = tests
            .into_iter()
            .filter(|test| match test.validate() {
                Ok(()) => true,
                Err(report) => {
                    tracing::warn!(test_id = %test.id, %report, "dropping invalid test");
                    false
                }
            })
            .map(|test| (test.id.clone(), test))
            .collect();
        Self { tests }
    }

    /// Looks up a test by content id
    pub fn get(&self, test_id: &str) -> Option<&Test> {
        self.tests.get(test_id)
    }

    /// Number of tests in the bank
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Whether the bank holds no tests
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fill_in_test() -> Test {
        serde_json::from_str(
            r#"{
                "id": "t1",
                "title": "Grammar",
                "type": "fill_in",
                "text": "___ quick fox jumps over ___ lazy dog near ___ river.",
                "blanks": [
                    { "options": ["The", "A", "An"], "answer": "The" },
                    { "options": ["the", "an"], "answer": ["the", "The"], "explanation": "Definite article." },
                    { "options": ["a", "the"], "answer": "the" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_bank_indexes_by_id() {
        let bank = TestBank::new(vec![fill_in_test()]);
        assert_eq!(bank.len(), 1);
        assert!(bank.get("t1").is_some());
        assert!(bank.get("t2").is_none());
    }

    #[test]
    fn test_bank_drops_invalid_content() {
        let mut bad = fill_in_test();
        bad.id = String::new();
        let bank = TestBank::new(vec![bad]);
        assert!(bank.is_empty());
    }

    #[test]
    fn test_tagged_union_wire_format() {
        let test = fill_in_test();
        let json = serde_json::to_string(&test).unwrap();
        assert!(json.contains(r#""type":"fill_in""#));
        assert!(json.contains(r#""id":"t1""#));
    }

    #[test]
    fn test_blank_sheet_matches_kind_and_size() {
        let test = fill_in_test();
        let sheet = test.blank_sheet();
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.answered(), 0);
        assert!(matches!(sheet, AnswerSheet::FillIn(_)));
    }

    #[test]
    fn test_record_ignores_out_of_range_and_mismatch() {
        let test = fill_in_test();
        let mut sheet = test.blank_sheet();

        sheet.record(Answer::Blank {
            index: 99,
            value: Some("The".to_owned()),
        });
        assert_eq!(sheet.answered(), 0);

        sheet.record(Answer::Choice {
            question: 0,
            option: 1,
        });
        assert_eq!(sheet.answered(), 0);

        sheet.record(Answer::Blank {
            index: 0,
            value: Some("The".to_owned()),
        });
        assert_eq!(sheet.answered(), 1);

        sheet.record(Answer::Blank {
            index: 0,
            value: None,
        });
        assert_eq!(sheet.answered(), 0);
    }

    #[test]
    fn test_wrong_kind_sheet_grades_to_zero() {
        let test = fill_in_test();
        let sheet = AnswerSheet::TrueFalse(vec![Some(true)]);
        let grade = test.grade(&sheet);
        assert_eq!(grade.score, 0);
        assert_eq!(grade.total, 3);
        assert!(grade.review.iter().all(|item| item.user_answer.is_none()));
    }

    #[test]
    fn test_percent_rounds_and_handles_empty() {
        let grade = Grade {
            score: 2,
            total: 3,
            review: vec![],
        };
        assert_eq!(grade.percent(), 67);

        let empty = Grade {
            score: 0,
            total: 0,
            review: vec![],
        };
        assert_eq!(empty.percent(), 0);
    }
}
