//! The `qcm init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("qcm.toml").exists() {
        println!("qcm.toml already exists, skipping.");
    } else {
        std::fs::write("qcm.toml", SAMPLE_CONFIG)?;
        println!("Created qcm.toml");
    }

    std::fs::create_dir_all("Sample")?;
    let lesson_path = Path::new("Sample/basics.json");
    if lesson_path.exists() {
        println!("Sample/basics.json already exists, skipping.");
    } else {
        std::fs::write(lesson_path, SAMPLE_LESSON)?;
        println!("Created Sample/basics.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: qcm validate --module Sample");
    println!("  2. Run: qcm quiz --module Sample --lesson basics");
    println!("  3. Add questions with: qcm add --module Sample --lesson basics ...");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# qcm configuration

# Directory whose subdirectories are modules of lesson files.
root = "."
stats_file = "stats.json"

# "random" or "fixed"
default_order = "random"

# Countdown in minutes (1-120); remove for untimed sessions.
# timer_minutes = 20

exam_size = 20
"#;

const SAMPLE_LESSON: &str = r#"[
  {
    "question": "Which organelle produces most of the cell's ATP?",
    "choices": ["Nucleus", "Mitochondrion", "Golgi apparatus", "Lysosome"],
    "correct": [1]
  },
  {
    "question": "Which of these are purine bases?",
    "choices": ["Adenine", "Cytosine", "Guanine", "Thymine"],
    "correct": [0, 2]
  },
  {
    "question": "Normal resting heart rate in adults (beats per minute)?",
    "choices": ["20-40", "60-100", "120-160", "180-200"],
    "correct": [1]
  }
]
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_lesson_parses() {
        let questions = qcm_core::loader::parse_lesson_str(SAMPLE_LESSON, "Sample/basics").unwrap();
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[1].correct_letters(), "A, C");
    }

    #[test]
    fn sample_config_parses() {
        let config: qcm_core::config::QcmConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        config.validate().unwrap();
        assert_eq!(config.exam_size, 20);
    }
}
