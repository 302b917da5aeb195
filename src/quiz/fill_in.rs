//! Fill-in-the-blanks question implementation
//!
//! A fill-in test is a single passage with placeholder markers, each blank
//! offering a set of selectable options and accepting one or more ground
//! truth answers. Matching is case-insensitive and whitespace-trimmed, so
//! `" The "` matches `"the"`.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::{Grade, ReviewItem};

/// Content of a fill-in test
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// The passage text; blanks are marked with `___`
    #[garde(length(max = crate::constants::content::MAX_PASSAGE_LENGTH))]
    pub text: String,
    /// The blanks, in passage order
    #[garde(length(max = crate::constants::content::MAX_BLANK_COUNT), dive)]
    pub blanks: Vec<Blank>,
}

/// One blank within the passage
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Blank {
    /// The selectable options offered to the player
    #[garde(length(min = 1, max = crate::constants::content::MAX_OPTION_COUNT))]
    pub options: Vec<String>,
    /// The accepted answer(s)
    #[garde(custom(|v, _| validate_accepted(v)))]
    pub answer: Accepted,
    /// Optional explanation shown in the review
    #[garde(skip)]
    pub explanation: Option<String>,
}

/// One or more accepted answers for a blank
///
/// The authoring format writes a bare string for a single accepted answer
/// and an array when several are acceptable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Accepted {
    /// Exactly one accepted answer
    One(String),
    /// Several accepted answers
    Many(Vec<String>),
}

impl Accepted {
    /// Iterates over the accepted answers
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        match self {
            Self::One(answer) => std::slice::from_ref(answer).iter(),
            Self::Many(answers) => answers.iter(),
        }
        .map(String::as_str)
    }
}

fn validate_accepted(accepted: &Accepted) -> garde::Result {
    if accepted.iter().any(|a| !a.trim().is_empty()) {
        Ok(())
    } else {
        Err(garde::Error::new("blank has no non-empty accepted answer"))
    }
}

/// Normalizes an answer for comparison: trimmed and lowercased
fn clean_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Grades fill-in answers against the blanks, in passage order
///
/// Missing trailing answers count as unanswered; an unanswered blank is
/// incorrect, never an error.
pub fn grade(config: &Config, answers: &[Option<String>]) -> Grade {
    let mut score = 0;
    let review = config
        .blanks
        .iter()
        .enumerate()
        .map(|(index, blank)| {
            let user_answer = answers.get(index).cloned().flatten();
            let is_correct = user_answer.as_deref().is_some_and(|given| {
                let given = clean_answer(given);
                blank.answer.iter().any(|accepted| clean_answer(accepted) == given)
            });
            if is_correct {
                score += 1;
            }
            ReviewItem {
                prompt: format!("Blank {}", index + 1),
                user_answer,
                correct_answers: blank.answer.iter().map(str::to_owned).collect(),
                is_correct,
                explanation: blank.explanation.clone(),
            }
        })
        .collect();

    Grade {
        score,
        total: config.blanks.len() as u32,
        review,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            text: "___ cat sat on ___ mat.".to_owned(),
            blanks: vec![
                Blank {
                    options: vec!["The".to_owned(), "A".to_owned()],
                    answer: Accepted::Many(vec!["The".to_owned(), "A".to_owned()]),
                    explanation: None,
                },
                Blank {
                    options: vec!["the".to_owned(), "an".to_owned()],
                    answer: Accepted::One("the".to_owned()),
                    explanation: Some("Definite article.".to_owned()),
                },
            ],
        }
    }

    #[test]
    fn test_case_insensitive_trimmed_match() {
        let grade = grade(
            &config(),
            &[Some(" the ".to_owned()), Some("THE".to_owned())],
        );
        assert_eq!(grade.score, 2);
        assert_eq!(grade.total, 2);
        assert!(grade.review.iter().all(|item| item.is_correct));
    }

    #[test]
    fn test_multiple_accepted_answers() {
        let grade = grade(&config(), &[Some("A".to_owned()), Some("an".to_owned())]);
        assert_eq!(grade.score, 1);
        assert!(grade.review[0].is_correct);
        assert!(!grade.review[1].is_correct);
    }

    #[test]
    fn test_unanswered_blank_is_incorrect() {
        let grade = grade(&config(), &[None, Some("the".to_owned())]);
        assert_eq!(grade.score, 1);
        assert!(!grade.review[0].is_correct);
        assert!(grade.review[0].user_answer.is_none());
    }

    #[test]
    fn test_short_answer_slice_grades_remaining_as_unanswered() {
        let grade = grade(&config(), &[]);
        assert_eq!(grade.score, 0);
        assert_eq!(grade.total, 2);
        assert_eq!(grade.review.len(), 2);
    }

    #[test]
    fn test_review_carries_explanation_and_order() {
        let grade = grade(&config(), &[None, None]);
        assert_eq!(grade.review[0].prompt, "Blank 1");
        assert_eq!(grade.review[1].prompt, "Blank 2");
        assert!(grade.review[0].explanation.is_none());
        assert_eq!(
            grade.review[1].explanation.as_deref(),
            Some("Definite article.")
        );
        assert_eq!(grade.review[1].correct_answers, vec!["the".to_owned()]);
    }

    #[test]
    fn test_accepted_answer_wire_formats() {
        let one: Accepted = serde_json::from_str(r#""the""#).unwrap();
        assert_eq!(one.iter().collect::<Vec<_>>(), vec!["the"]);

        let many: Accepted = serde_json::from_str(r#"["the","The"]"#).unwrap();
        assert_eq!(many.iter().count(), 2);
    }

    #[test]
    fn test_blank_requires_accepted_answer() {
        let blank = Blank {
            options: vec!["x".to_owned()],
            answer: Accepted::Many(vec![" ".to_owned()]),
            explanation: None,
        };
        assert!(blank.validate().is_err());
    }
}
