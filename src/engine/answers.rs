// src/engine/answers.rs

use super::{QuizEngine, QuizError};
use crate::{
    models::{question::OptionLetter, session::SessionContext},
    store::AnswerWrite,
};

impl QuizEngine {
    /// Records (or clears, with `None`) the answer to one exam question.
    ///
    /// Last write wins; there is no per-row version check, so two clients
    /// writing the same row may overwrite each other.
    pub async fn set_answer(
        &self,
        ctx: &SessionContext,
        row_id: i64,
        letter: Option<OptionLetter>,
    ) -> Result<(), QuizError> {
        let session = self.load_owned(ctx).await?;
        let now = self.clock.now();
        let session = self.enforce_deadline_at(session, now).await?;
        if session.is_finished() {
            return Err(QuizError::SessionClosed(session.id));
        }

        let row = self
            .store
            .find_snapshot_row(session.id, row_id)
            .await?
            .ok_or(QuizError::SnapshotRowNotFound(row_id))?;

        if let Some(letter) = letter {
            if !row.accepts(letter) {
                return Err(QuizError::InvalidOption { row_id, letter });
            }
        }

        if row.chosen_option() == letter {
            return Ok(());
        }

        match self.store.set_chosen_option(session.id, row_id, letter, now).await? {
            AnswerWrite::Written => {
                tracing::debug!(session_id = session.id, row_id, chosen = ?letter, "Answer recorded");
                Ok(())
            }
            AnswerWrite::SessionFinished => Err(QuizError::SessionClosed(session.id)),
            AnswerWrite::RowMissing => Err(QuizError::SnapshotRowNotFound(row_id)),
        }
    }
}
