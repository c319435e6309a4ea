// src/engine/deadline.rs

use chrono::{DateTime, Utc};

use super::{QuizEngine, QuizError};
use crate::models::session::Session;

/// `true` once `now` has reached the session deadline.
pub fn is_expired(session: &Session, now: DateTime<Utc>) -> bool {
    now >= session.deadline
}

/// Whole seconds left before the deadline, never negative.
pub fn remaining_seconds(session: &Session, now: DateTime<Utc>) -> i64 {
    (session.deadline - now).num_seconds().max(0)
}

impl QuizEngine {
    pub fn is_expired(&self, session: &Session) -> bool {
        is_expired(session, self.clock.now())
    }

    /// Finalizes an active session whose deadline has passed.
    ///
    /// Must run before any read or write that depends on the session being
    /// active; the clock is read again on every call.
    pub(super) async fn enforce_deadline(&self, session: Session) -> Result<Session, QuizError> {
        self.enforce_deadline_at(session, self.clock.now()).await
    }

    /// Same as `enforce_deadline`, judged at a clock reading the caller holds.
    pub(super) async fn enforce_deadline_at(
        &self,
        session: Session,
        now: DateTime<Utc>,
    ) -> Result<Session, QuizError> {
        if session.is_finished() || !is_expired(&session, now) {
            return Ok(session);
        }
        tracing::info!(
            session_id = session.id,
            deadline = %session.deadline,
            "Deadline passed; finalizing session"
        );
        self.finalize(session).await
    }
}
