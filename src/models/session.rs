// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'sessions' table in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub student_id: i64,
    pub class_code: String,

    #[sqlx(rename = "n_questions")]
    pub question_count: i32,

    #[sqlx(rename = "started_at")]
    pub created_at: DateTime<Utc>,

    /// Absolute instant after which no answer is accepted.
    pub deadline: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            session_id: self.id,
            student_id: self.student_id,
        }
    }
}

/// Identifies the session a request acts on and the student acting.
/// Passed explicitly into every engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: i64,
    pub student_id: i64,
}

/// Values the store needs to insert a session row.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub student_id: i64,
    pub class_code: String,
    pub question_count: i32,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

/// DTO for starting a session. Missing fields fall back to configuration.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(range(min = 1, max = 200))]
    pub question_count: Option<i32>,
    #[validate(range(min = 1, max = 86400))]
    pub duration_seconds: Option<i64>,
}
