//! Exam assembly across the lessons of a module.
//!
//! Each lesson gets a quota proportional to its size, bounded by a per-lesson
//! minimum and maximum that depend on the exam size. Quotas are then nudged
//! one question at a time until they add up to the requested size.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{QcmError, Result};
use crate::model::{Bank, BankOrigin};
use crate::traits::LessonStore;

/// Exams of this size or smaller use the tighter per-lesson bounds.
pub const SMALL_EXAM_LIMIT: usize = 20;

/// Per-lesson `(min, max)` quota for an exam of `target` questions.
pub fn quota_bounds(target: usize) -> (usize, usize) {
    if target <= SMALL_EXAM_LIMIT {
        (1, 5)
    } else {
        (2, 10)
    }
}

/// Compute how many questions each lesson contributes.
///
/// `sizes[i]` is the question count of lesson `i`; the returned quotas are in
/// the same order, never exceed the matching size, and sum to `target`.
pub fn compute_quotas(sizes: &[usize], target: usize) -> Result<Vec<usize>> {
    let available: usize = sizes.iter().sum();
    if available < target {
        return Err(QcmError::InsufficientQuestions {
            requested: target,
            available,
        });
    }
    if target == 0 {
        return Ok(vec![0; sizes.len()]);
    }

    let (min_q, max_q) = quota_bounds(target);
    let mut quotas: Vec<usize> = sizes
        .iter()
        .map(|&size| {
            let share = (size as f64 / available as f64 * target as f64).round_ties_even();
            (share as usize).clamp(min_q, max_q).min(size)
        })
        .collect();

    let capped: Vec<usize> = sizes.iter().map(|&size| size.min(max_q)).collect();
    let mut sum = grow(&mut quotas, &capped, target);
    if sum < target {
        // The per-lesson maximum cannot reach the target; let lessons give
        // everything they have.
        tracing::debug!("quota maximum {max_q} too low for {target}, relaxing to lesson sizes");
        sum = grow(&mut quotas, sizes, target);
    }
    if sum < target {
        return Err(QcmError::InsufficientQuestions {
            requested: target,
            available: sum,
        });
    }

    sum = shrink(&mut quotas, min_q, target);
    if sum > target {
        tracing::debug!("quota minimum {min_q} too high for {target}, relaxing to zero");
        sum = shrink(&mut quotas, 0, target);
    }
    debug_assert_eq!(sum, target);

    Ok(quotas)
}

/// Increment quotas below their cap, in order, until the sum reaches `target`
/// or a full pass changes nothing. Returns the final sum.
fn grow(quotas: &mut [usize], caps: &[usize], target: usize) -> usize {
    let mut sum: usize = quotas.iter().sum();
    while sum < target {
        let before = sum;
        for (quota, &cap) in quotas.iter_mut().zip(caps) {
            if *quota < cap {
                *quota += 1;
                sum += 1;
                if sum == target {
                    break;
                }
            }
        }
        if sum == before {
            break;
        }
    }
    sum
}

/// Decrement quotas above `floor`, in order, until the sum reaches `target`
/// or a full pass changes nothing. Returns the final sum.
fn shrink(quotas: &mut [usize], floor: usize, target: usize) -> usize {
    let mut sum: usize = quotas.iter().sum();
    while sum > target {
        let before = sum;
        for quota in quotas.iter_mut() {
            if *quota > floor {
                *quota -= 1;
                sum -= 1;
                if sum == target {
                    break;
                }
            }
        }
        if sum == before {
            break;
        }
    }
    sum
}

/// Build an exam of `target` questions sampled across every lesson of `module`.
///
/// Lessons that fail to load are skipped with a warning. A module with a
/// single usable lesson yields a shuffled slice of at most `target` questions.
pub fn build_exam<R: Rng + ?Sized>(
    store: &dyn LessonStore,
    module: &str,
    target: usize,
    rng: &mut R,
) -> Result<Bank> {
    if target == 0 {
        return Err(QcmError::EmptyBank(format!("{module} exam of size 0")));
    }

    let mut banks = Vec::new();
    for lesson in store.list_lessons(module)? {
        match store.load_bank(module, &lesson) {
            Ok(bank) if !bank.is_empty() => banks.push(bank),
            Ok(_) => tracing::debug!("lesson {module}/{lesson} is empty"),
            Err(e) => tracing::warn!("skipping lesson {module}/{lesson}: {e}"),
        }
    }

    let origin = BankOrigin::Exam {
        module: module.to_string(),
        size: target,
    };

    if banks.len() == 1 {
        let mut questions = banks.remove(0).questions;
        questions.shuffle(rng);
        questions.truncate(target);
        return Ok(Bank::new(origin, questions));
    }
    if banks.is_empty() {
        return Err(QcmError::NotFound(format!("usable lessons in module {module}")));
    }

    let sizes: Vec<usize> = banks.iter().map(Bank::len).collect();
    let quotas = compute_quotas(&sizes, target)?;
    tracing::debug!("exam quotas for {module}: {quotas:?}");

    let mut questions = Vec::with_capacity(target);
    for (bank, quota) in banks.iter().zip(quotas) {
        questions.extend(bank.questions.choose_multiple(rng, quota).cloned());
    }
    questions.shuffle(rng);

    Ok(Bank::new(origin, questions))
}
