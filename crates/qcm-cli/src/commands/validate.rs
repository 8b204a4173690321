//! The `qcm validate` command.

use anyhow::{bail, Result};

use qcm_core::loader::{validate_bank, DirectoryStore};
use qcm_core::traits::LessonStore;

use super::Globals;

pub fn execute(globals: &Globals, module: &str) -> Result<()> {
    let config = globals.resolve()?;
    let store = DirectoryStore::new(&config.root);

    let lessons = store.list_lessons(module)?;
    let mut total_warnings = 0;
    let mut broken = 0;

    for lesson in &lessons {
        let bank = match store.load_bank(module, lesson) {
            Ok(bank) => bank,
            Err(e) => {
                println!("Lesson: {lesson}");
                println!("  ERROR: {e}");
                broken += 1;
                continue;
            }
        };
        println!("Lesson: {lesson} ({} questions)", bank.len());

        let warnings = validate_bank(&bank);
        for w in &warnings {
            let prefix = w
                .position
                .map(|i| format!("  [Q{}]", i + 1))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if broken > 0 {
        bail!("{broken} lesson(s) in {module} could not be loaded");
    }
    if total_warnings == 0 {
        println!("All lessons valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
