// src/store/mod.rs

//! Persistence boundary of the quiz engine.
//!
//! The engine only talks to [`QuizStore`]; `PgQuizStore` is used in
//! production and `MemoryQuizStore` in tests or when no database is configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    question::{NewQuestion, OptionLetter, QuestionBankEntry},
    session::{NewSession, Session},
    snapshot::{NewSnapshotRow, SnapshotRow},
    student::Student,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryQuizStore;
pub use postgres::PgQuizStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row breaks a data invariant.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result of an answer write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerWrite {
    Written,
    /// The session was finalized, or its deadline passed, before the write landed.
    SessionFinished,
    /// No such row in this session.
    RowMissing,
}

#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Returns the student for (class_code, display_name), creating it on first use.
    async fn upsert_student(&self, class_code: &str, display_name: &str)
    -> Result<Student, StoreError>;

    async fn find_student(&self, id: i64) -> Result<Option<Student>, StoreError>;

    async fn count_questions(&self, class_code: &str) -> Result<i64, StoreError>;

    async fn list_questions(&self, class_code: &str) -> Result<Vec<QuestionBankEntry>, StoreError>;

    /// Appends all questions or none. Returns the number inserted.
    async fn insert_questions(
        &self,
        class_code: &str,
        questions: &[NewQuestion],
    ) -> Result<u64, StoreError>;

    async fn delete_question(&self, id: i64) -> Result<bool, StoreError>;

    /// Inserts the session row and its exam paper in one atomic step.
    async fn create_session(
        &self,
        session: NewSession,
        rows: Vec<NewSnapshotRow>,
    ) -> Result<Session, StoreError>;

    async fn find_session(&self, id: i64) -> Result<Option<Session>, StoreError>;

    /// Sets `finished_at` unless already set; returns the stored session.
    async fn finish_session(&self, id: i64, at: DateTime<Utc>) -> Result<Session, StoreError>;

    /// Snapshot rows of a session in creation order.
    async fn list_snapshot_rows(&self, session_id: i64) -> Result<Vec<SnapshotRow>, StoreError>;

    async fn find_snapshot_row(
        &self,
        session_id: i64,
        row_id: i64,
    ) -> Result<Option<SnapshotRow>, StoreError>;

    /// Overwrites the chosen option while the session is unfinished and
    /// `now` is still before its deadline.
    async fn set_chosen_option(
        &self,
        session_id: i64,
        row_id: i64,
        letter: Option<OptionLetter>,
        now: DateTime<Utc>,
    ) -> Result<AnswerWrite, StoreError>;
}
