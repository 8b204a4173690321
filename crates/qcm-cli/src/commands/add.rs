//! The `qcm add` command.

use anyhow::{bail, Result};

use qcm_core::authoring::{add_question, QuestionDraft};
use qcm_core::loader::{lesson_name, DirectoryStore};
use qcm_core::model::parse_choice_label;

use super::Globals;

pub fn execute(
    globals: &Globals,
    module: &str,
    lesson: &str,
    question: String,
    choices: Vec<String>,
    correct: &str,
) -> Result<()> {
    let config = globals.resolve()?;
    let store = DirectoryStore::new(&config.root);

    let draft = QuestionDraft {
        text: question,
        choices,
        correct: parse_correct(correct)?,
    };
    let count = add_question(&store, module, lesson, draft)?;

    println!(
        "Question added to {}/{} ({count} question(s) in the lesson).",
        module.trim(),
        lesson_name(lesson.trim())
    );
    Ok(())
}

/// Parse correct answers given as letters (`"A,C"`) or 1-based numbers (`"1,3"`).
fn parse_correct(input: &str) -> Result<Vec<usize>> {
    let mut correct = Vec::new();
    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let index = if let Ok(n) = token.parse::<usize>() {
            match n.checked_sub(1) {
                Some(i) => i,
                None => bail!("answer numbers start at 1, got {token}"),
            }
        } else {
            let mut chars = token.chars();
            match (chars.next().and_then(parse_choice_label), chars.next()) {
                (Some(i), None) => i,
                _ => bail!("unrecognised correct answer {token:?}; use letters such as A,C"),
            }
        };
        if !correct.contains(&index) {
            correct.push(index);
        }
    }
    Ok(correct)
}
