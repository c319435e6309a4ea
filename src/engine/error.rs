// src/engine/error.rs

use crate::{models::question::OptionLetter, store::StoreError};

/// Everything an engine call can report. Deadline expiry is not an error:
/// it finalizes the session and the call continues from there.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("the question bank has {available} usable questions, {requested} requested")]
    InsufficientBank { available: usize, requested: usize },

    #[error("question {question_id} has no usable correct option")]
    BankIntegrity { question_id: i64 },

    #[error("session {0} is closed")]
    SessionClosed(i64),

    #[error("option {letter} of question {row_id} is empty")]
    InvalidOption { row_id: i64, letter: OptionLetter },

    #[error("session {0} is not finished yet")]
    SessionNotFinished(i64),

    #[error("session {0} not found")]
    SessionNotFound(i64),

    #[error("question {0} is not part of this session")]
    SnapshotRowNotFound(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}
