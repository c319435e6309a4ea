// src/engine/paper.rs

use super::{QuizEngine, QuizError, deadline};
use crate::models::{
    report::{ExamPaper, PaperOption, PaperQuestion, SessionStatus},
    session::SessionContext,
};

impl QuizEngine {
    /// The exam paper as the student sees it: options with text only, the
    /// current answers, progress and an advisory countdown. Never includes
    /// correct options or explanations.
    pub async fn paper(&self, ctx: &SessionContext) -> Result<ExamPaper, QuizError> {
        let session = self.load_owned(ctx).await?;
        let session = self.enforce_deadline(session).await?;
        let rows = self.store.list_snapshot_rows(session.id).await?;

        let questions: Vec<PaperQuestion> = rows
            .iter()
            .enumerate()
            .map(|(idx, row)| PaperQuestion {
                row_id: row.id(),
                position: idx + 1,
                prompt: row.prompt().to_string(),
                options: row
                    .options()
                    .present()
                    .map(|(letter, text)| PaperOption { letter, text: text.to_string() })
                    .collect(),
                chosen_option: row.chosen_option(),
            })
            .collect();

        let (status, remaining_seconds) = if session.is_finished() {
            (SessionStatus::Finished, 0)
        } else {
            (SessionStatus::Active, deadline::remaining_seconds(&session, self.clock.now()))
        };

        Ok(ExamPaper {
            session_id: session.id,
            status,
            deadline: session.deadline,
            remaining_seconds,
            answered: questions.iter().filter(|q| q.chosen_option.is_some()).count(),
            total: questions.len(),
            questions,
        })
    }
}
