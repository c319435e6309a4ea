// src/engine/sampler.rs

use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};

use super::error::QuizError;
use crate::models::question::{OptionLetter, QuestionBankEntry};

/// Repairs an entry whose correct option has no text.
///
/// Returns `None` when the entry cannot be used at all: the correct letter
/// is unreadable, or no option has text.
pub fn repair(entry: &QuestionBankEntry) -> Option<QuestionBankEntry> {
    let declared: OptionLetter = entry.correct_option.parse().ok()?;
    let options = entry.options();

    let correct = if options.has(declared) {
        declared
    } else {
        let replacement = options.fallback_for(declared)?;
        tracing::warn!(
            question_id = entry.id,
            declared = %declared,
            replacement = %replacement,
            "Correct option points at an empty option; reassigned"
        );
        replacement
    };

    let mut repaired = entry.clone();
    repaired.correct_option = correct.to_string();
    Some(repaired)
}

/// Draws `n` distinct questions uniformly at random, without replacement.
///
/// Entries are repaired on the way out; unusable entries are skipped and a
/// replacement is drawn. The bank itself is never modified.
pub fn sample<R: Rng + ?Sized>(
    bank: &[QuestionBankEntry],
    n: usize,
    rng: &mut R,
) -> Result<Vec<QuestionBankEntry>, QuizError> {
    let mut seen = HashSet::with_capacity(bank.len());
    let mut candidates: Vec<&QuestionBankEntry> =
        bank.iter().filter(|entry| seen.insert(entry.id)).collect();

    if candidates.len() < n {
        return Err(QuizError::InsufficientBank {
            available: candidates.len(),
            requested: n,
        });
    }

    candidates.shuffle(rng);

    let mut picked = Vec::with_capacity(n);
    let mut first_broken = None;
    for entry in candidates {
        if picked.len() == n {
            break;
        }
        match repair(entry) {
            Some(repaired) => picked.push(repaired),
            None => {
                tracing::warn!(question_id = entry.id, "Skipping unusable bank entry");
                first_broken.get_or_insert(entry.id);
            }
        }
    }

    if picked.len() < n {
        return Err(match first_broken {
            Some(question_id) => QuizError::BankIntegrity { question_id },
            None => QuizError::InsufficientBank {
                available: picked.len(),
                requested: n,
            },
        });
    }

    Ok(picked)
}
