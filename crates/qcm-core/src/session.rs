//! Quiz session state machine.
//!
//! A session starts immediately: [`QuizSession::start`] returns a session that
//! is already in progress on its first question. Moving forward past the last
//! question finishes it; there is no separate finish command. The optional
//! countdown is a stored deadline, checked whenever the caller passes in the
//! current time.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{QcmError, Result};
use crate::model::{Bank, OrderMode, Question};
use crate::scoring;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    InProgress,
    Finished,
}

/// One navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Forward,
    Backward,
}

/// Results handed to the statistics aggregator once per finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub key: String,
    /// One score per question; questions never evaluated count as `0.0`.
    pub scores: Vec<f64>,
}

/// Run-time state of one quiz attempt over a bank.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    bank: Bank,
    order: Vec<usize>,
    /// Index into `order`; equals `order.len()` once finished.
    position: usize,
    answers: BTreeMap<usize, BTreeSet<usize>>,
    scores: Vec<Option<f64>>,
    deadline: Option<DateTime<Utc>>,
    expired: bool,
    recorded: bool,
}

impl QuizSession {
    /// Start a session over `bank`, drawing a fresh question order.
    pub fn start<R: Rng + ?Sized>(bank: Bank, mode: OrderMode, rng: &mut R) -> Result<Self> {
        if bank.is_empty() {
            return Err(QcmError::EmptyBank(bank.origin.stats_key()));
        }

        let mut order: Vec<usize> = (0..bank.len()).collect();
        if mode == OrderMode::Random {
            order.shuffle(rng);
        }

        tracing::debug!(
            "starting {} ({} questions, {mode} order)",
            bank.origin,
            bank.len()
        );

        Ok(Self {
            id: Uuid::new_v4(),
            scores: vec![None; bank.len()],
            bank,
            order,
            position: 0,
            answers: BTreeMap::new(),
            deadline: None,
            expired: false,
            recorded: false,
        })
    }

    /// Attach a countdown of `minutes` starting at `now`.
    pub fn with_time_limit(mut self, now: DateTime<Utc>, minutes: u32) -> Self {
        self.deadline = Some(now + Duration::minutes(i64::from(minutes)));
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    /// Question indices in presentation order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn state(&self) -> SessionState {
        if self.position >= self.order.len() {
            SessionState::Finished
        } else {
            SessionState::InProgress
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state() == SessionState::Finished
    }

    /// `true` if the session was finished by its countdown.
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn scores(&self) -> &[Option<f64>] {
        &self.scores
    }

    pub fn score_at(&self, position: usize) -> Option<f64> {
        self.scores.get(position).copied().flatten()
    }

    /// The question shown at `position`.
    pub fn question_at(&self, position: usize) -> Option<&Question> {
        self.order
            .get(position)
            .and_then(|&index| self.bank.get(index))
    }

    /// The question under the cursor, or `None` once finished.
    pub fn current(&self) -> Option<&Question> {
        self.question_at(self.position)
    }

    /// The stored selection at `position` (empty if never set).
    pub fn selection(&self, position: usize) -> BTreeSet<usize> {
        self.answers.get(&position).cloned().unwrap_or_default()
    }

    fn check_open(&self) -> Result<()> {
        if self.is_finished() {
            return Err(QcmError::SessionFinished);
        }
        Ok(())
    }

    /// Record or overwrite the selection for `position`. Does not score.
    pub fn set_answer(
        &mut self,
        position: usize,
        selected: impl IntoIterator<Item = usize>,
    ) -> Result<()> {
        self.check_open()?;
        let question = self
            .question_at(position)
            .ok_or(QcmError::PositionOutOfRange {
                position,
                len: self.order.len(),
            })?;

        let selected: BTreeSet<usize> = selected.into_iter().collect();
        let choices = question.choices().len();
        if let Some(&choice) = selected.iter().find(|&&c| c >= choices) {
            return Err(QcmError::InvalidChoice { choice, choices });
        }

        self.answers.insert(position, selected);
        Ok(())
    }

    /// Flip one choice of the current question's selection.
    pub fn toggle_choice(&mut self, choice: usize) -> Result<()> {
        let position = self.position;
        let mut selected = self.selection(position);
        if !selected.remove(&choice) {
            selected.insert(choice);
        }
        self.set_answer(position, selected)
    }

    /// Score the current question from its stored selection and keep the
    /// result. Calling it again without a new selection yields the same value.
    pub fn evaluate_current(&mut self) -> Result<f64> {
        self.check_open()?;
        let position = self.position;
        let question = self
            .current()
            .ok_or(QcmError::PositionOutOfRange {
                position,
                len: self.order.len(),
            })?;

        let selected = self.answers.get(&position).cloned().unwrap_or_default();
        let score = scoring::score(question.correct(), &selected)?;
        self.scores[position] = Some(score);
        Ok(score)
    }

    /// Move one question forward or back.
    ///
    /// Forward scores the current question first and finishes the session when
    /// it moves past the last one. Backward stops at the first question and
    /// never scores. Answers and scores are kept in both directions. Once the
    /// session is finished this is a no-op.
    pub fn advance(&mut self, step: Step) -> Result<SessionState> {
        if self.is_finished() {
            return Ok(SessionState::Finished);
        }

        match step {
            Step::Forward => {
                self.evaluate_current()?;
                self.position += 1;
            }
            Step::Backward => {
                self.position = self.position.saturating_sub(1);
            }
        }

        let state = self.state();
        if state == SessionState::Finished {
            tracing::debug!("{} finished: {:.2}/{}", self.bank.origin, self.final_score(), self.len());
        }
        Ok(state)
    }

    /// Sum of every recorded score.
    pub fn final_score(&self) -> f64 {
        self.scores.iter().flatten().sum()
    }

    /// Positions that were not answered perfectly, ascending. Questions that
    /// were never scored count as wrong.
    pub fn wrong_positions(&self) -> Vec<usize> {
        self.scores
            .iter()
            .enumerate()
            .filter(|(_, score)| score.map_or(true, |s| s < 1.0))
            .map(|(position, _)| position)
            .collect()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Time left on the countdown at `now`, never negative. `None` without a
    /// countdown.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.deadline
            .map(|deadline| (deadline - now).max(Duration::zero()))
    }

    /// Finish the session if its countdown has run out at `now`.
    ///
    /// The question under the cursor is scored if it was not already; the
    /// remaining unscored questions stay unscored. Returns `true` if this call
    /// finished the session.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        let Some(deadline) = self.deadline else {
            return false;
        };
        if self.is_finished() || now < deadline {
            return false;
        }

        if self.score_at(self.position).is_none() {
            if let Err(e) = self.evaluate_current() {
                tracing::warn!("could not score question {}: {e}", self.position + 1);
            }
        }
        self.position = self.order.len();
        self.expired = true;
        tracing::info!("{} timed out", self.bank.origin);
        true
    }

    /// Hand out the results for statistics, at most once per session.
    pub fn take_completion(&mut self) -> Option<Completion> {
        if !self.is_finished() || self.recorded {
            return None;
        }
        self.recorded = true;
        Some(Completion {
            key: self.bank.origin.stats_key(),
            scores: self.scores.iter().map(|s| s.unwrap_or(0.0)).collect(),
        })
    }
}
