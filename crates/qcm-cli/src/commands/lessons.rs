//! The `qcm lessons` command.

use anyhow::Result;

use qcm_core::loader::DirectoryStore;
use qcm_core::traits::LessonStore;

use super::Globals;

pub fn execute(globals: &Globals, module: &str) -> Result<()> {
    let config = globals.resolve()?;
    let store = DirectoryStore::new(&config.root);

    let lessons = store.list_lessons(module)?;
    if lessons.is_empty() {
        println!("Module {module} has no lessons.");
        return Ok(());
    }

    println!("Module: {module}");
    for lesson in &lessons {
        match store.load_bank(module, lesson) {
            Ok(bank) => println!("  {lesson} ({} questions)", bank.len()),
            Err(e) => println!("  {lesson} (unreadable: {e})"),
        }
    }

    Ok(())
}
