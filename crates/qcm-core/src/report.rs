//! End-of-quiz report with JSON persistence.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{choice_label, BankOrigin};
use crate::scoring::Outcome;
use crate::session::QuizSession;

/// Summary of a finished (or abandoned) session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Session identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Lesson or exam the questions came from.
    pub origin: BankOrigin,
    /// Sum of the per-question scores.
    pub final_score: f64,
    /// Number of questions in the session.
    pub question_count: usize,
    /// Whether the countdown ended the session.
    pub timed_out: bool,
    /// Outcome of each question, in presentation order.
    pub outcomes: Vec<Outcome>,
    /// Every question not answered perfectly.
    pub review: Vec<ReviewItem>,
}

/// A wrong or partially right question, with its correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewItem {
    /// Zero-based position in the session.
    pub position: usize,
    pub question: String,
    pub choices: Vec<ReviewChoice>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewChoice {
    pub label: String,
    pub text: String,
    pub correct: bool,
    pub selected: bool,
}

impl SessionReport {
    pub fn from_session(session: &QuizSession) -> Self {
        let outcomes = session
            .scores()
            .iter()
            .map(|&score| Outcome::from_score(score))
            .collect();

        let review = session
            .wrong_positions()
            .into_iter()
            .filter_map(|position| {
                let question = session.question_at(position)?;
                let selected: BTreeSet<usize> = session.selection(position);
                Some(ReviewItem {
                    position,
                    question: question.text().to_string(),
                    choices: question
                        .choices()
                        .iter()
                        .enumerate()
                        .map(|(i, text)| ReviewChoice {
                            label: choice_label(i),
                            text: text.clone(),
                            correct: question.is_correct(i),
                            selected: selected.contains(&i),
                        })
                        .collect(),
                    score: session.score_at(position),
                })
            })
            .collect();

        Self {
            id: session.id(),
            created_at: Utc::now(),
            origin: session.bank().origin.clone(),
            final_score: session.final_score(),
            question_count: session.len(),
            timed_out: session.is_expired(),
            outcomes,
            review,
        }
    }

    /// Final score as a percentage of the question count.
    pub fn percent(&self) -> f64 {
        if self.question_count == 0 {
            0.0
        } else {
            self.final_score / self.question_count as f64 * 100.0
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the review as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**{}:** {:.2} / {} ({:.1}%)\n\n",
            self.origin,
            self.final_score,
            self.question_count,
            self.percent()
        ));
        if self.timed_out {
            md.push_str("_Time ran out before the last question._\n\n");
        }

        if !self.review.is_empty() {
            md.push_str("### Review\n\n");
            for item in &self.review {
                md.push_str(&format!("**Q{}. {}**\n\n", item.position + 1, item.question));
                for choice in &item.choices {
                    let mark = if choice.correct { "x" } else { " " };
                    let picked = if choice.selected { " (your answer)" } else { "" };
                    md.push_str(&format!(
                        "- [{mark}] {}. {}{picked}\n",
                        choice.label, choice.text
                    ));
                }
                md.push('\n');
            }
        }

        md
    }
}
