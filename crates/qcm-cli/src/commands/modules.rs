//! The `qcm modules` command.

use anyhow::Result;

use qcm_core::loader::DirectoryStore;
use qcm_core::traits::LessonStore;

use super::Globals;

pub fn execute(globals: &Globals) -> Result<()> {
    let config = globals.resolve()?;
    let store = DirectoryStore::new(&config.root);

    let modules = store.list_modules()?;
    if modules.is_empty() {
        println!(
            "No modules found under {}. Run `qcm init` to create a sample one.",
            config.root.display()
        );
        return Ok(());
    }

    for module in &modules {
        let lessons = store.list_lessons(module)?;
        println!("{module} ({} lesson(s))", lessons.len());
    }

    Ok(())
}
