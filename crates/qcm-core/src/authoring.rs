//! Adding questions to lessons.

use crate::error::{QcmError, Result};
use crate::loader::{check_name, lesson_name};
use crate::model::Question;
use crate::traits::LessonStore;

/// A question as typed by an author, before validation.
#[derive(Debug, Clone, Default)]
pub struct QuestionDraft {
    pub text: String,
    pub choices: Vec<String>,
    pub correct: Vec<usize>,
}

impl QuestionDraft {
    /// Validate and trim the draft into a question.
    pub fn into_question(self) -> Result<Question> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(QcmError::InvalidDraft("question text is empty".into()));
        }
        if self.choices.len() < 2 {
            return Err(QcmError::InvalidDraft(
                "at least two choices are required".into(),
            ));
        }
        if let Some(i) = self.choices.iter().position(|c| c.trim().is_empty()) {
            return Err(QcmError::InvalidDraft(format!("choice {} is empty", i + 1)));
        }
        if self.correct.is_empty() {
            return Err(QcmError::InvalidDraft(
                "select at least one correct answer".into(),
            ));
        }
        if let Some(&i) = self.correct.iter().find(|&&i| i >= self.choices.len()) {
            return Err(QcmError::InvalidDraft(format!(
                "correct answer {} does not match any of the {} choices",
                i + 1,
                self.choices.len()
            )));
        }

        let choices = self.choices.iter().map(|c| c.trim().to_string()).collect();
        Question::new(text, choices, self.correct)
    }
}

/// Append a question to `module/lesson`, creating either if needed.
///
/// An existing lesson that cannot be parsed is left untouched and the error
/// is returned. Returns the new number of questions in the lesson.
pub fn add_question(
    store: &dyn LessonStore,
    module: &str,
    lesson: &str,
    draft: QuestionDraft,
) -> Result<usize> {
    let module = module.trim();
    let lesson = lesson_name(lesson.trim());
    check_name(module)?;
    check_name(lesson)?;

    let question = draft.into_question()?;

    let mut questions = match store.load_bank(module, lesson) {
        Ok(bank) => bank.questions,
        Err(e) if e.is_not_found() => Vec::new(),
        Err(e) => return Err(e),
    };
    questions.push(question);
    store.save_bank(module, lesson, &questions)?;

    tracing::info!(
        "added question to {module}/{lesson} ({} total)",
        questions.len()
    );
    Ok(questions.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DirectoryStore;
    use crate::memory::MemoryStore;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            text: "  Normal platelet count?  ".into(),
            choices: vec![
                "150-400 G/L".into(),
                " 4-10 G/L ".into(),
                "1-2 G/L".into(),
                "500-900 G/L".into(),
            ],
            correct: vec![0],
        }
    }

    #[test]
    fn draft_is_trimmed() {
        let q = draft().into_question().unwrap();
        assert_eq!(q.text(), "Normal platelet count?");
        assert_eq!(q.choices()[1], "4-10 G/L");
    }

    #[test]
    fn draft_validation() {
        let mut d = draft();
        d.text = "   ".into();
        assert!(matches!(d.into_question(), Err(QcmError::InvalidDraft(_))));

        let mut d = draft();
        d.choices[2] = " ".into();
        assert!(d.into_question().unwrap_err().to_string().contains("choice 3"));

        let mut d = draft();
        d.correct.clear();
        assert!(d.into_question().is_err());

        let mut d = draft();
        d.correct = vec![4];
        assert!(d.into_question().is_err());
    }

    #[test]
    fn add_creates_lesson_then_appends() {
        let store = MemoryStore::new();
        assert_eq!(add_question(&store, "Hematology", "platelets", draft()).unwrap(), 1);
        assert_eq!(
            add_question(&store, "Hematology", "platelets.json", draft()).unwrap(),
            2
        );
        assert_eq!(store.lesson_len("Hematology", "platelets"), Some(2));
    }

    #[test]
    fn add_keeps_correct_indices_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let mut d = draft();
        d.correct = vec![2, 0];
        add_question(&store, "Hematology", "platelets", d).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("Hematology/platelets.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["correct"], serde_json::json!([0, 2]));
    }

    #[test]
    fn malformed_lesson_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Hematology")).unwrap();
        let path = dir.path().join("Hematology/platelets.json");
        std::fs::write(&path, "not json").unwrap();

        let store = DirectoryStore::new(dir.path());
        let err = add_question(&store, "Hematology", "platelets", draft()).unwrap_err();
        assert!(matches!(err, QcmError::MalformedData { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn rejects_unsafe_names() {
        let store = MemoryStore::new();
        for (module, lesson) in [("", "l"), (".hidden", "l"), ("m", "a/b"), ("m", "..")] {
            let err = add_question(&store, module, lesson, draft()).unwrap_err();
            assert!(matches!(err, QcmError::InvalidName(_)), "{module}/{lesson}");
        }
    }
}
