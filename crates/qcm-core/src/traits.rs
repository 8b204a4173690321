//! Storage seams for question banks and statistics.
//!
//! The sampler, the authoring flow and the statistics aggregator only see
//! these traits. `DirectoryStore` and `JsonStatsFile` are the filesystem
//! implementations; `MemoryStore` backs tests.

use crate::error::Result;
use crate::model::{Bank, Question};
use crate::statistics::StatsBook;

// ---------------------------------------------------------------------------
// Lesson store
// ---------------------------------------------------------------------------

/// Source of modules, lessons and their question banks.
pub trait LessonStore {
    /// Every module that holds at least one lesson, sorted.
    fn list_modules(&self) -> Result<Vec<String>>;

    /// Lesson identifiers of a module, sorted.
    ///
    /// Fails with `NotFound` if the module does not exist.
    fn list_lessons(&self, module: &str) -> Result<Vec<String>>;

    /// Load and validate one lesson.
    fn load_bank(&self, module: &str, lesson: &str) -> Result<Bank>;

    /// Replace the full content of a lesson, creating the module if needed.
    fn save_bank(&self, module: &str, lesson: &str, questions: &[Question]) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Statistics store
// ---------------------------------------------------------------------------

/// Persisted per-key running totals.
pub trait StatsStore {
    /// Load the current totals. Never fails: missing or corrupt data is an
    /// empty book.
    fn load(&self) -> StatsBook;

    /// Persist the full book, replacing what was there.
    fn save(&self, book: &StatsBook) -> Result<()>;
}
