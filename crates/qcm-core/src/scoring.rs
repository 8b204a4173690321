//! Partial-credit scoring for a single question.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{QcmError, Result};

/// Score a selection against the set of correct answers.
///
/// - exact match: `1.0`
/// - any selected index that is not correct: `0.0`
/// - otherwise the fraction of correct answers that were selected
pub fn score(correct: &BTreeSet<usize>, selected: &BTreeSet<usize>) -> Result<f64> {
    if correct.is_empty() {
        return Err(QcmError::malformed(
            "question",
            "cannot score a question with no correct answer",
        ));
    }
    if selected == correct {
        return Ok(1.0);
    }
    if !selected.is_subset(correct) {
        return Ok(0.0);
    }
    Ok(selected.len() as f64 / correct.len() as f64)
}

/// How a scored question is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Partial,
    Incorrect,
    /// Never evaluated, e.g. when the timer ran out first.
    Unanswered,
}

impl Outcome {
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            None => Outcome::Unanswered,
            Some(s) if s >= 1.0 => Outcome::Correct,
            Some(s) if s <= 0.0 => Outcome::Incorrect,
            Some(_) => Outcome::Partial,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Outcome::Correct => "OK",
            Outcome::Partial => "PARTIAL",
            Outcome::Incorrect => "WRONG",
            Outcome::Unanswered => "SKIPPED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    #[test]
    fn exact_match_scores_one() {
        for correct in [set(&[0]), set(&[1, 3]), set(&[0, 1, 2, 3])] {
            assert_eq!(score(&correct, &correct).unwrap(), 1.0);
        }
    }

    #[test]
    fn any_distractor_zeroes_the_question() {
        let correct = set(&[0, 2]);
        assert_eq!(score(&correct, &set(&[1])).unwrap(), 0.0);
        assert_eq!(score(&correct, &set(&[0, 1])).unwrap(), 0.0);
        assert_eq!(score(&correct, &set(&[0, 1, 2, 3])).unwrap(), 0.0);
    }

    #[test]
    fn strict_subset_earns_proportional_credit() {
        let correct = set(&[0, 1, 2, 3]);
        assert_eq!(score(&correct, &set(&[0])).unwrap(), 0.25);
        assert_eq!(score(&correct, &set(&[1, 3])).unwrap(), 0.5);
        assert_eq!(score(&correct, &set(&[0, 1, 2])).unwrap(), 0.75);
    }

    #[test]
    fn empty_selection_scores_zero() {
        assert_eq!(score(&set(&[1]), &set(&[])).unwrap(), 0.0);
    }

    #[test]
    fn worked_example() {
        let correct = set(&[0, 2]);
        assert_eq!(score(&correct, &set(&[0])).unwrap(), 0.5);
        assert_eq!(score(&correct, &set(&[0, 2])).unwrap(), 1.0);
        assert_eq!(score(&correct, &set(&[0, 1])).unwrap(), 0.0);
    }

    #[test]
    fn empty_correct_set_is_malformed() {
        let err = score(&set(&[]), &set(&[0])).unwrap_err();
        assert!(matches!(err, QcmError::MalformedData { .. }));
    }

    #[test]
    fn outcome_classification() {
        assert_eq!(Outcome::from_score(Some(1.0)), Outcome::Correct);
        assert_eq!(Outcome::from_score(Some(0.5)), Outcome::Partial);
        assert_eq!(Outcome::from_score(Some(0.0)), Outcome::Incorrect);
        assert_eq!(Outcome::from_score(None), Outcome::Unanswered);
    }
}
