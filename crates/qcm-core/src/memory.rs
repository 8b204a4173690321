//! In-memory stores for tests and benches.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::error::{QcmError, Result};
use crate::model::{Bank, BankOrigin, Question};
use crate::statistics::StatsBook;
use crate::traits::{LessonStore, StatsStore};

/// A lesson store that keeps every module in a map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    modules: RefCell<BTreeMap<String, BTreeMap<String, Vec<Question>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a lesson.
    pub fn with_lesson(self, module: &str, lesson: &str, questions: Vec<Question>) -> Self {
        self.modules
            .borrow_mut()
            .entry(module.to_string())
            .or_default()
            .insert(lesson.to_string(), questions);
        self
    }

    /// Number of questions currently stored for a lesson.
    pub fn lesson_len(&self, module: &str, lesson: &str) -> Option<usize> {
        self.modules
            .borrow()
            .get(module)
            .and_then(|lessons| lessons.get(lesson))
            .map(Vec::len)
    }
}

impl LessonStore for MemoryStore {
    fn list_modules(&self) -> Result<Vec<String>> {
        Ok(self
            .modules
            .borrow()
            .iter()
            .filter(|(_, lessons)| !lessons.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn list_lessons(&self, module: &str) -> Result<Vec<String>> {
        self.modules
            .borrow()
            .get(module)
            .map(|lessons| lessons.keys().cloned().collect())
            .ok_or_else(|| QcmError::NotFound(format!("module {module}")))
    }

    fn load_bank(&self, module: &str, lesson: &str) -> Result<Bank> {
        let modules = self.modules.borrow();
        let questions = modules
            .get(module)
            .and_then(|lessons| lessons.get(lesson))
            .ok_or_else(|| QcmError::NotFound(format!("lesson {module}/{lesson}")))?;
        Ok(Bank::new(
            BankOrigin::Lesson {
                module: module.to_string(),
                lesson: lesson.to_string(),
            },
            questions.clone(),
        ))
    }

    fn save_bank(&self, module: &str, lesson: &str, questions: &[Question]) -> Result<()> {
        self.modules
            .borrow_mut()
            .entry(module.to_string())
            .or_default()
            .insert(lesson.to_string(), questions.to_vec());
        Ok(())
    }
}

/// A statistics store held in memory. Counts saves so tests can assert
/// nothing was written twice.
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    book: RefCell<StatsBook>,
    saves: Cell<usize>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl StatsStore for MemoryStatsStore {
    fn load(&self) -> StatsBook {
        self.book.borrow().clone()
    }

    fn save(&self, book: &StatsBook) -> Result<()> {
        *self.book.borrow_mut() = book.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
