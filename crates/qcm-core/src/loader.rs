//! Lesson file loader.
//!
//! Modules are the non-hidden subdirectories of a root directory; lessons are
//! the `*.json` files inside a module. Each lesson file holds a JSON array of
//! `{ "question", "choices", "correct" }` objects.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{QcmError, Result};
use crate::model::{Bank, BankOrigin, Question};
use crate::traits::LessonStore;

const LESSON_EXTENSION: &str = "json";

/// Lesson store backed by a directory tree.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a lesson file, whether or not it exists.
    pub fn lesson_path(&self, module: &str, lesson: &str) -> PathBuf {
        self.root
            .join(module)
            .join(format!("{}.{LESSON_EXTENSION}", lesson_name(lesson)))
    }

    fn lesson_stems(dir: &Path) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|_| QcmError::NotFound(format!("module directory {}", dir.display())))?;

        let mut lessons: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().is_some_and(|ext| ext == LESSON_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .filter(|stem| !stem.starts_with('.'))
            .collect();
        lessons.sort();
        Ok(lessons)
    }
}

impl LessonStore for DirectoryStore {
    fn list_modules(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|_| {
            QcmError::NotFound(format!("question root {}", self.root.display()))
        })?;

        let mut modules = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') || !path.is_dir() {
                continue;
            }
            match Self::lesson_stems(&path) {
                Ok(lessons) if !lessons.is_empty() => modules.push(name.to_string()),
                Ok(_) => {}
                Err(e) => tracing::warn!("skipping {}: {}", path.display(), e),
            }
        }
        modules.sort();
        Ok(modules)
    }

    fn list_lessons(&self, module: &str) -> Result<Vec<String>> {
        let dir = self.root.join(module);
        if !dir.is_dir() {
            return Err(QcmError::NotFound(format!("module {module}")));
        }
        Self::lesson_stems(&dir)
    }

    fn load_bank(&self, module: &str, lesson: &str) -> Result<Bank> {
        let lesson = lesson_name(lesson);
        let path = self.lesson_path(module, lesson);
        if !path.is_file() {
            return Err(QcmError::NotFound(format!("lesson {module}/{lesson}")));
        }

        let source_name = format!("{module}/{lesson}");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| QcmError::malformed(&source_name, e.to_string()))?;
        let questions = parse_lesson_str(&content, &source_name)?;

        tracing::debug!("loaded {} questions from {}", questions.len(), path.display());

        Ok(Bank::new(
            BankOrigin::Lesson {
                module: module.to_string(),
                lesson: lesson.to_string(),
            },
            questions,
        ))
    }

    fn save_bank(&self, module: &str, lesson: &str, questions: &[Question]) -> Result<()> {
        check_name(module)?;
        let lesson = lesson_name(lesson);
        check_name(lesson)?;

        let path = self.lesson_path(module, lesson);
        let mut json = serde_json::to_string_pretty(questions)
            .map_err(|e| QcmError::malformed(format!("{module}/{lesson}"), e.to_string()))?;
        json.push('\n');
        write_atomic(&path, json.as_bytes())
    }
}

/// Parse the content of a lesson file (useful for testing).
pub fn parse_lesson_str(content: &str, source_name: &str) -> Result<Vec<Question>> {
    serde_json::from_str::<Vec<Question>>(content)
        .map_err(|e| QcmError::malformed(source_name, e.to_string()))
}

/// Lesson identifier without a trailing `.json`.
pub fn lesson_name(name: &str) -> &str {
    name.strip_suffix(".json").unwrap_or(name)
}

/// Reject names that cannot be used as a single path component.
pub(crate) fn check_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name.starts_with('.')
        || name.contains(['/', '\\'])
    {
        return Err(QcmError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Replace `path` with `contents` through a temp file in the same directory.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| QcmError::write_failure(dir, e))?;

    let mut tmp =
        tempfile::NamedTempFile::new_in(dir).map_err(|e| QcmError::write_failure(path, e))?;
    tmp.write_all(contents)
        .and_then(|_| tmp.flush())
        .map_err(|e| QcmError::write_failure(path, e))?;
    tmp.persist(path)
        .map_err(|e| QcmError::write_failure(path, e.error))?;
    Ok(())
}

/// A non-fatal issue found in a lesson.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Zero-based question index (if applicable).
    pub position: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Check a bank for issues that do not prevent quizzing.
pub fn validate_bank(bank: &Bank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate question text
    let mut seen = HashSet::new();
    for (i, q) in bank.questions.iter().enumerate() {
        if !seen.insert(q.text().trim().to_lowercase()) {
            warnings.push(ValidationWarning {
                position: Some(i),
                message: format!("duplicate question: {}", q.text()),
            });
        }
    }

    for (i, q) in bank.questions.iter().enumerate() {
        if q.text().trim().is_empty() {
            warnings.push(ValidationWarning {
                position: Some(i),
                message: "question text is empty".into(),
            });
        }

        let mut choices = HashSet::new();
        for choice in q.choices() {
            if choice.trim().is_empty() {
                warnings.push(ValidationWarning {
                    position: Some(i),
                    message: "a choice is empty".into(),
                });
            } else if !choices.insert(choice.trim()) {
                warnings.push(ValidationWarning {
                    position: Some(i),
                    message: format!("duplicate choice: {choice}"),
                });
            }
        }
    }

    if bank.is_empty() {
        warnings.push(ValidationWarning {
            position: None,
            message: "lesson has no questions".into(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENZYMES: &str = r#"[
  {
    "question": "Which enzymes are hydrolases?",
    "choices": ["Lipase", "Hexokinase", "Amylase", "Catalase"],
    "correct": [0, 2]
  },
  {
    "question": "Km measures...",
    "choices": ["Affinity", "Vmax", "pH", "Temperature"],
    "correct": [0]
  }
]"#;

    fn write_lesson(root: &Path, module: &str, lesson: &str, content: &str) {
        let dir = root.join(module);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{lesson}.json")), content).unwrap();
    }

    #[test]
    fn parse_valid_lesson() {
        let questions = parse_lesson_str(ENZYMES, "Biochemistry/enzymes").unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].correct_letters(), "A, C");
    }

    #[test]
    fn parse_rejects_non_array() {
        let err = parse_lesson_str(r#"{"question": "x"}"#, "m/l").unwrap_err();
        assert!(matches!(err, QcmError::MalformedData { .. }));
    }

    #[test]
    fn parse_rejects_missing_fields() {
        let err = parse_lesson_str(r#"[{"question": "x", "choices": ["a", "b"]}]"#, "m/l")
            .unwrap_err();
        assert!(err.to_string().contains("correct"));
    }

    #[test]
    fn parse_rejects_non_list_choices() {
        let bad = r#"[{"question": "x", "choices": "a", "correct": [0]}]"#;
        assert!(parse_lesson_str(bad, "m/l").is_err());
    }

    #[test]
    fn list_modules_skips_hidden_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        write_lesson(dir.path(), "Hematology", "anemia", ENZYMES);
        write_lesson(dir.path(), "Biochemistry", "enzymes", ENZYMES);
        write_lesson(dir.path(), ".git", "config", ENZYMES);
        std::fs::create_dir_all(dir.path().join("empty")).unwrap();
        std::fs::write(dir.path().join("notes.json"), "[]").unwrap();

        let store = DirectoryStore::new(dir.path());
        assert_eq!(
            store.list_modules().unwrap(),
            vec!["Biochemistry", "Hematology"]
        );
    }

    #[test]
    fn list_lessons_sorted_stems() {
        let dir = tempfile::tempdir().unwrap();
        write_lesson(dir.path(), "Biochemistry", "metabolism", ENZYMES);
        write_lesson(dir.path(), "Biochemistry", "enzymes", ENZYMES);
        std::fs::write(dir.path().join("Biochemistry/readme.txt"), "x").unwrap();

        let store = DirectoryStore::new(dir.path());
        assert_eq!(
            store.list_lessons("Biochemistry").unwrap(),
            vec!["enzymes", "metabolism"]
        );
        assert!(store.list_lessons("Nope").unwrap_err().is_not_found());
    }

    #[test]
    fn load_bank_not_found_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write_lesson(dir.path(), "Biochemistry", "broken", "[{\"question\": 1}]");
        let store = DirectoryStore::new(dir.path());

        assert!(store
            .load_bank("Biochemistry", "missing")
            .unwrap_err()
            .is_not_found());
        assert!(matches!(
            store.load_bank("Biochemistry", "broken").unwrap_err(),
            QcmError::MalformedData { .. }
        ));
    }

    #[test]
    fn load_bank_accepts_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write_lesson(dir.path(), "Biochemistry", "enzymes", ENZYMES);
        let store = DirectoryStore::new(dir.path());

        let bank = store.load_bank("Biochemistry", "enzymes.json").unwrap();
        assert_eq!(bank.origin.stats_key(), "Biochemistry/enzymes");
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn save_bank_creates_module_and_keeps_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let q = Question::new(
            "Hématie : durée de vie ?",
            vec!["120 jours".into(), "7 jours".into()],
            [0],
        )
        .unwrap();

        store.save_bank("Hématologie", "globules", &[q.clone()]).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("Hématologie/globules.json")).unwrap();
        assert!(raw.contains("Hématie"));
        let bank = store.load_bank("Hématologie", "globules").unwrap();
        assert_eq!(bank.questions, vec![q]);
    }

    #[test]
    fn save_bank_rejects_path_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let err = store.save_bank("../escape", "l", &[]).unwrap_err();
        assert!(matches!(err, QcmError::InvalidName(_)));
    }

    #[test]
    fn validate_flags_duplicates() {
        let q = Question::new("Same?", vec!["a".into(), "a".into()], [0]).unwrap();
        let bank = Bank::new(
            BankOrigin::Lesson {
                module: "m".into(),
                lesson: "l".into(),
            },
            vec![q.clone(), q],
        );
        let warnings = validate_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate question")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate choice")));
    }
}
