//! Question banks, exam sampling, quiz sessions and scoring.
//!
//! This crate holds everything the `qcm` CLI drives: the lesson loader, the
//! exam sampler, the session state machine, partial-credit scoring and the
//! persisted statistics.

pub mod authoring;
pub mod config;
pub mod error;
pub mod exam;
pub mod loader;
pub mod memory;
pub mod model;
pub mod report;
pub mod scoring;
pub mod session;
pub mod statistics;
pub mod traits;

pub use error::{QcmError, Result};
