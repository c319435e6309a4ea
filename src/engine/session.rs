// src/engine/session.rs

use chrono::Duration;

use super::{QuizEngine, QuizError, sampler};
use crate::models::{
    session::{NewSession, Session, SessionContext},
    snapshot::NewSnapshotRow,
    student::Student,
};

impl QuizEngine {
    /// Starts a session for `student`: samples `n` questions from the class
    /// bank and writes the session together with its exam paper.
    ///
    /// Either the session and all `n` rows exist afterwards, or nothing does.
    pub async fn start(
        &self,
        student: &Student,
        n: usize,
        duration: Duration,
    ) -> Result<(Session, SessionContext), QuizError> {
        let bank = self.store.list_questions(&student.class_code).await?;
        let sampled = sampler::sample(&bank, n, &mut rand::thread_rng())?;

        let rows = sampled
            .iter()
            .map(|entry| {
                NewSnapshotRow::from_entry(entry).map_err(|e| {
                    tracing::error!(question_id = entry.id, error = %e, "Sampled entry failed snapshot checks");
                    QuizError::BankIntegrity { question_id: entry.id }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let now = self.clock.now();
        let new_session = NewSession {
            student_id: student.id,
            class_code: student.class_code.clone(),
            question_count: i32::try_from(n).unwrap_or(i32::MAX),
            created_at: now,
            deadline: now + duration,
        };

        let session = self.store.create_session(new_session, rows).await.map_err(|e| {
            tracing::error!(student_id = student.id, error = %e, "Session start aborted");
            QuizError::from(e)
        })?;

        tracing::info!(
            session_id = session.id,
            student_id = student.id,
            questions = n,
            deadline = %session.deadline,
            "Session started"
        );

        let ctx = session.context();
        Ok((session, ctx))
    }

    /// Finalizes the session. Finishing a finished session returns it unchanged.
    pub async fn finish(&self, ctx: &SessionContext) -> Result<Session, QuizError> {
        let session = self.load_owned(ctx).await?;
        self.finalize(session).await
    }

    /// Loads the session without touching its state.
    pub async fn session(&self, ctx: &SessionContext) -> Result<Session, QuizError> {
        self.load_owned(ctx).await
    }

    pub(super) async fn finalize(&self, session: Session) -> Result<Session, QuizError> {
        if session.is_finished() {
            return Ok(session);
        }
        let finished = self.store.finish_session(session.id, self.clock.now()).await?;
        tracing::info!(session_id = finished.id, "Session finished");
        Ok(finished)
    }
}
