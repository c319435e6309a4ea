// src/engine/grading.rs

use super::{QuizEngine, QuizError};
use crate::models::{
    report::{AnswerStatus, GradeReport, QuestionOutcome},
    session::{Session, SessionContext},
    snapshot::SnapshotRow,
};

/// Scores a finished session's rows. Unanswered rows never count as correct.
pub fn grade_rows(session: &Session, rows: &[SnapshotRow]) -> Result<GradeReport, QuizError> {
    let finished_at = session
        .finished_at
        .ok_or(QuizError::SessionNotFinished(session.id))?;

    let per_question: Vec<QuestionOutcome> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let chosen = row.chosen_option();
            let status = match chosen {
                None => AnswerStatus::Unanswered,
                Some(_) if row.is_correct() => AnswerStatus::Correct,
                Some(_) => AnswerStatus::Incorrect,
            };
            QuestionOutcome {
                row_id: row.id(),
                position: idx + 1,
                prompt: row.prompt().to_string(),
                status,
                chosen_option: chosen,
                chosen_text: chosen.map(|l| row.options().text(l).to_string()),
                correct_option: row.correct_option(),
                correct_text: row.options().text(row.correct_option()).to_string(),
                explanation: row.explanation().map(str::to_string),
            }
        })
        .collect();

    let score = per_question
        .iter()
        .filter(|q| q.status == AnswerStatus::Correct)
        .count();

    Ok(GradeReport {
        session_id: session.id,
        score,
        total: per_question.len(),
        elapsed_seconds: (finished_at - session.created_at).num_seconds().max(0),
        finished_at,
        per_question,
    })
}

impl QuizEngine {
    /// Returns the correction of a session.
    ///
    /// An active session past its deadline is finalized first and then
    /// graded; an active session still within its time fails with
    /// `SessionNotFinished`. Grading never writes, so repeated calls agree.
    pub async fn grade(&self, ctx: &SessionContext) -> Result<GradeReport, QuizError> {
        let session = self.load_owned(ctx).await?;
        let session = self.enforce_deadline(session).await?;
        if !session.is_finished() {
            return Err(QuizError::SessionNotFinished(session.id));
        }

        let rows = self.store.list_snapshot_rows(session.id).await?;
        let report = grade_rows(&session, &rows)?;
        tracing::info!(
            session_id = session.id,
            score = report.score,
            total = report.total,
            "Session graded"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::engine::test_support::harness;
    use crate::models::question::OptionLetter;
    use crate::store::QuizStore;

    #[tokio::test]
    async fn ten_correct_out_of_thirty() {
        let h = harness(40).await;
        let student = h.student("Mario Rossi").await;
        let (session, ctx) = h.engine.start(&student, 30, Duration::seconds(1800)).await.unwrap();
        let rows = h.store.list_snapshot_rows(session.id).await.unwrap();

        for row in rows.iter().take(10) {
            h.engine.set_answer(&ctx, row.id(), Some(row.correct_option())).await.unwrap();
        }
        h.clock.advance(Duration::seconds(754));
        h.engine.finish(&ctx).await.unwrap();

        let report = h.engine.grade(&ctx).await.unwrap();
        assert_eq!(report.score, 10);
        assert_eq!(report.total, 30);
        assert_eq!(report.elapsed_seconds, 754);
        assert_eq!(
            report.per_question.iter().filter(|q| q.status == AnswerStatus::Unanswered).count(),
            20
        );
    }

    #[tokio::test]
    async fn wrong_answers_do_not_score() {
        let h = harness(10).await;
        let student = h.student("Lia").await;
        let (session, ctx) = h.engine.start(&student, 4, Duration::seconds(600)).await.unwrap();
        let rows = h.store.list_snapshot_rows(session.id).await.unwrap();

        let wrong = |l: OptionLetter| if l == OptionLetter::A { OptionLetter::B } else { OptionLetter::A };
        h.engine.set_answer(&ctx, rows[0].id(), Some(rows[0].correct_option())).await.unwrap();
        h.engine.set_answer(&ctx, rows[1].id(), Some(wrong(rows[1].correct_option()))).await.unwrap();
        h.engine.finish(&ctx).await.unwrap();

        let report = h.engine.grade(&ctx).await.unwrap();
        assert_eq!(report.score, 1);
        assert_eq!(report.per_question[0].status, AnswerStatus::Correct);
        assert_eq!(report.per_question[1].status, AnswerStatus::Incorrect);
        assert_eq!(report.per_question[1].chosen_option, Some(wrong(rows[1].correct_option())));
        assert!(report.per_question[1].chosen_text.is_some());
    }

    #[tokio::test]
    async fn grading_twice_gives_the_same_result() {
        let h = harness(10).await;
        let student = h.student("Nina").await;
        let (session, ctx) = h.engine.start(&student, 5, Duration::seconds(600)).await.unwrap();
        let rows = h.store.list_snapshot_rows(session.id).await.unwrap();
        let row = &rows[0];
        h.engine.set_answer(&ctx, row.id(), Some(row.correct_option())).await.unwrap();
        h.engine.finish(&ctx).await.unwrap();

        let first = h.engine.grade(&ctx).await.unwrap();
        h.clock.advance(Duration::minutes(10));
        let second = h.engine.grade(&ctx).await.unwrap();
        assert_eq!((first.score, first.total), (second.score, second.total));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn grading_an_active_session_is_refused() {
        let h = harness(10).await;
        let student = h.student("Nina").await;
        let (session, ctx) = h.engine.start(&student, 5, Duration::seconds(600)).await.unwrap();

        let err = h.engine.grade(&ctx).await.unwrap_err();
        assert!(matches!(err, QuizError::SessionNotFinished(id) if id == session.id));
    }

    #[tokio::test]
    async fn grading_an_expired_session_finalizes_it() {
        let h = harness(10).await;
        let student = h.student("Nina").await;
        let (_, ctx) = h.engine.start(&student, 5, Duration::seconds(600)).await.unwrap();

        h.clock.advance(Duration::seconds(900));
        let report = h.engine.grade(&ctx).await.unwrap();
        assert_eq!(report.total, 5);
        assert_eq!(report.elapsed_seconds, 900);
        assert!(h.engine.session(&ctx).await.unwrap().is_finished());
    }

    #[tokio::test]
    async fn unanswered_row_is_reported_as_unanswered() {
        let h = harness(10).await;
        let student = h.student("Tommaso").await;
        let (session, ctx) = h.engine.start(&student, 10, Duration::seconds(600)).await.unwrap();
        h.engine.finish(&ctx).await.unwrap();

        let report = h.engine.grade(&ctx).await.unwrap();
        let rows = h.store.list_snapshot_rows(session.id).await.unwrap();
        let (idx, row) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.correct_option() == OptionLetter::C)
            .unwrap();

        let outcome = &report.per_question[idx];
        assert_eq!(outcome.row_id, row.id());
        assert_eq!(outcome.status, AnswerStatus::Unanswered);
        assert_eq!(outcome.chosen_option, None);
        assert_eq!(outcome.chosen_text, None);
        assert_eq!(outcome.correct_option, OptionLetter::C);
        assert_eq!(outcome.correct_text, row.options().option_c);
    }

    #[tokio::test]
    async fn breakdown_follows_snapshot_order() {
        let h = harness(10).await;
        let student = h.student("Ugo").await;
        let (session, ctx) = h.engine.start(&student, 6, Duration::seconds(600)).await.unwrap();
        h.engine.finish(&ctx).await.unwrap();

        let rows = h.store.list_snapshot_rows(session.id).await.unwrap();
        let report = h.engine.grade(&ctx).await.unwrap();
        let ids: Vec<_> = report.per_question.iter().map(|q| q.row_id).collect();
        assert_eq!(ids, rows.iter().map(|r| r.id()).collect::<Vec<_>>());
        assert_eq!(report.per_question[0].position, 1);
        for (outcome, row) in report.per_question.iter().zip(&rows) {
            assert_eq!(outcome.explanation.as_deref(), row.explanation());
        }
    }
}
