//! Core data model types for qcm.
//!
//! Questions, the banks that hold them, and the small enums the rest of the
//! crate passes around.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QcmError, Result};

/// A single multiple-choice question.
///
/// Always holds at least two choices and a non-empty set of correct indices
/// that all point into `choices`. The only way to build one is through
/// [`Question::new`] (or deserialization, which goes through the same checks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    text: String,
    choices: Vec<String>,
    correct: BTreeSet<usize>,
}

/// On-disk shape of a question inside a lesson file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuestionRecord {
    question: String,
    choices: Vec<String>,
    correct: Vec<usize>,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QcmError;

    fn try_from(record: QuestionRecord) -> Result<Self> {
        Question::new(record.question, record.choices, record.correct)
    }
}

impl From<Question> for QuestionRecord {
    fn from(q: Question) -> Self {
        QuestionRecord {
            question: q.text,
            choices: q.choices,
            correct: q.correct.into_iter().collect(),
        }
    }
}

impl Question {
    /// Build a question, checking the choice and answer invariants.
    pub fn new(
        text: impl Into<String>,
        choices: Vec<String>,
        correct: impl IntoIterator<Item = usize>,
    ) -> Result<Self> {
        let text = text.into();
        let correct: BTreeSet<usize> = correct.into_iter().collect();

        if choices.len() < 2 {
            return Err(QcmError::malformed(
                format!("question {text:?}"),
                format!("needs at least 2 choices, found {}", choices.len()),
            ));
        }
        if correct.is_empty() {
            return Err(QcmError::malformed(
                format!("question {text:?}"),
                "no correct answer listed",
            ));
        }
        if let Some(&bad) = correct.iter().find(|&&i| i >= choices.len()) {
            return Err(QcmError::malformed(
                format!("question {text:?}"),
                format!(
                    "correct index {bad} is out of range for {} choices",
                    choices.len()
                ),
            ));
        }

        Ok(Self {
            text,
            choices,
            correct,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    /// Indices of the correct choices, ascending.
    pub fn correct(&self) -> &BTreeSet<usize> {
        &self.correct
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        self.correct.contains(&choice)
    }

    /// The correct choices as display letters, e.g. `"A, C"`.
    pub fn correct_letters(&self) -> String {
        self.correct
            .iter()
            .map(|&i| choice_label(i))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Display label for a choice index: `A`, `B`, ... then `27`, `28`, ...
pub fn choice_label(index: usize) -> String {
    if index < 26 {
        char::from(b'A' + index as u8).to_string()
    } else {
        (index + 1).to_string()
    }
}

/// Parse a display letter back into a choice index (case-insensitive).
pub fn parse_choice_label(label: char) -> Option<usize> {
    let upper = label.to_ascii_uppercase();
    upper
        .is_ascii_uppercase()
        .then(|| (upper as u8 - b'A') as usize)
}

/// Order in which a session presents its questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    #[default]
    Random,
    Fixed,
}

impl fmt::Display for OrderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderMode::Random => write!(f, "random"),
            OrderMode::Fixed => write!(f, "fixed"),
        }
    }
}

impl FromStr for OrderMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" | "shuffled" => Ok(OrderMode::Random),
            "fixed" | "sequential" => Ok(OrderMode::Fixed),
            other => Err(format!("unknown order mode: {other}")),
        }
    }
}

/// Where a bank came from. Determines the statistics key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BankOrigin {
    /// A single lesson file of a module.
    Lesson { module: String, lesson: String },
    /// An exam sampled across every lesson of a module.
    Exam { module: String, size: usize },
}

impl BankOrigin {
    pub fn module(&self) -> &str {
        match self {
            BankOrigin::Lesson { module, .. } | BankOrigin::Exam { module, .. } => module,
        }
    }

    /// Key under which results are aggregated: `module/lesson` or `module/Exam-N`.
    pub fn stats_key(&self) -> String {
        match self {
            BankOrigin::Lesson { module, lesson } => format!("{module}/{lesson}"),
            BankOrigin::Exam { module, size } => format!("{module}/Exam-{size}"),
        }
    }
}

impl fmt::Display for BankOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stats_key())
    }
}

/// An ordered set of questions being quizzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub origin: BankOrigin,
    pub questions: Vec<Question>,
}

impl Bank {
    pub fn new(origin: BankOrigin, questions: Vec<Question>) -> Self {
        Self { origin, questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("choice {i}")).collect()
    }

    #[test]
    fn question_rejects_empty_correct_set() {
        let err = Question::new("q", choices(4), Vec::new()).unwrap_err();
        assert!(matches!(err, QcmError::MalformedData { .. }));
    }

    #[test]
    fn question_rejects_out_of_range_index() {
        let err = Question::new("q", choices(4), [0, 4]).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn question_rejects_single_choice() {
        assert!(Question::new("q", choices(1), [0]).is_err());
    }

    #[test]
    fn question_json_uses_lesson_keys_and_ignores_extras() {
        let json = r#"{"question": "2+2?", "choices": ["3", "4"], "correct": [1], "hint": "easy"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.text(), "2+2?");
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));

        let back = serde_json::to_value(&q).unwrap();
        assert_eq!(back["question"], "2+2?");
        assert_eq!(back["correct"], serde_json::json!([1]));
    }

    #[test]
    fn question_json_with_bad_index_fails() {
        let json = r#"{"question": "x", "choices": ["a", "b"], "correct": [2]}"#;
        assert!(serde_json::from_str::<Question>(json).is_err());
    }

    #[test]
    fn correct_letters_are_sorted() {
        let q = Question::new("q", choices(4), [2, 0]).unwrap();
        assert_eq!(q.correct_letters(), "A, C");
    }

    #[test]
    fn choice_labels_roundtrip() {
        assert_eq!(choice_label(0), "A");
        assert_eq!(choice_label(3), "D");
        assert_eq!(parse_choice_label('d'), Some(3));
        assert_eq!(parse_choice_label('1'), None);
    }

    #[test]
    fn order_mode_display_and_parse() {
        assert_eq!(OrderMode::Random.to_string(), "random");
        assert_eq!("Fixed".parse::<OrderMode>().unwrap(), OrderMode::Fixed);
        assert!("alphabetical".parse::<OrderMode>().is_err());
    }

    #[test]
    fn stats_keys() {
        let lesson = BankOrigin::Lesson {
            module: "Biochemistry".into(),
            lesson: "enzymes".into(),
        };
        let exam = BankOrigin::Exam {
            module: "Biochemistry".into(),
            size: 20,
        };
        assert_eq!(lesson.stats_key(), "Biochemistry/enzymes");
        assert_eq!(exam.stats_key(), "Biochemistry/Exam-20");
        assert_eq!(exam.module(), "Biochemistry");
    }
}
