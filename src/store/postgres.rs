// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{AnswerWrite, QuizStore, StoreError};
use crate::models::{
    question::{NewQuestion, OptionLetter, QuestionBankEntry},
    session::{NewSession, Session},
    snapshot::{NewSnapshotRow, SnapshotRecord, SnapshotRow},
    student::Student,
};

const SESSION_COLUMNS: &str =
    "id, student_id, class_code, n_questions, started_at, deadline, finished_at";

const SNAPSHOT_COLUMNS: &str = "id, session_id, question_text, option_a, option_b, option_c, \
     option_d, correct_option, chosen_option, explanation";

const QUESTION_COLUMNS: &str =
    "id, question_text, option_a, option_b, option_c, option_d, correct_option, explanation";

/// `QuizStore` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgQuizStore {
    pool: PgPool,
}

impl PgQuizStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_rows(records: Vec<SnapshotRecord>) -> Result<Vec<SnapshotRow>, StoreError> {
    records
        .into_iter()
        .map(|record| {
            let id = record.id;
            SnapshotRow::try_from(record)
                .map_err(|e| StoreError::Corrupt(format!("quiz_answers row {id}: {e}")))
        })
        .collect()
}

#[async_trait]
impl QuizStore for PgQuizStore {
    async fn upsert_student(
        &self,
        class_code: &str,
        display_name: &str,
    ) -> Result<Student, StoreError> {
        let inserted = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (class_code, nickname)
            VALUES ($1, $2)
            ON CONFLICT (class_code, nickname) DO NOTHING
            RETURNING id, class_code, nickname
            "#,
        )
        .bind(class_code)
        .bind(display_name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(student) = inserted {
            tracing::info!(student_id = student.id, class_code, "Created student");
            return Ok(student);
        }

        let student = sqlx::query_as::<_, Student>(
            "SELECT id, class_code, nickname FROM students WHERE class_code = $1 AND nickname = $2",
        )
        .bind(class_code)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(student)
    }

    async fn find_student(&self, id: i64) -> Result<Option<Student>, StoreError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT id, class_code, nickname FROM students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn count_questions(&self, class_code: &str) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM question_bank WHERE class_code = $1")
            .bind(class_code)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_questions(&self, class_code: &str) -> Result<Vec<QuestionBankEntry>, StoreError> {
        let entries = sqlx::query_as::<_, QuestionBankEntry>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM question_bank WHERE class_code = $1 ORDER BY id"
        ))
        .bind(class_code)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn insert_questions(
        &self,
        class_code: &str,
        questions: &[NewQuestion],
    ) -> Result<u64, StoreError> {
        if questions.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO question_bank \
             (class_code, question_text, option_a, option_b, option_c, option_d, correct_option, explanation) ",
        );
        builder.push_values(questions, |mut b, q| {
            b.push_bind(class_code)
                .push_bind(&q.prompt)
                .push_bind(&q.options.option_a)
                .push_bind(&q.options.option_b)
                .push_bind(&q.options.option_c)
                .push_bind(&q.options.option_d)
                .push_bind(q.correct_option.as_str())
                .push_bind(&q.explanation);
        });

        // A single statement is atomic on its own.
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_question(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM question_bank WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_session(
        &self,
        session: NewSession,
        rows: Vec<NewSnapshotRow>,
    ) -> Result<Session, StoreError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Session>(&format!(
            "INSERT INTO sessions (student_id, class_code, n_questions, started_at, deadline) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session.student_id)
        .bind(&session.class_code)
        .bind(session.question_count)
        .bind(session.created_at)
        .bind(session.deadline)
        .fetch_one(&mut *tx)
        .await?;

        if !rows.is_empty() {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO quiz_answers \
                 (session_id, question_text, option_a, option_b, option_c, option_d, correct_option, explanation) ",
            );
            builder.push_values(&rows, |mut b, row| {
                let options = row.options();
                b.push_bind(created.id)
                    .push_bind(row.prompt())
                    .push_bind(&options.option_a)
                    .push_bind(&options.option_b)
                    .push_bind(&options.option_c)
                    .push_bind(&options.option_d)
                    .push_bind(row.correct_option().as_str())
                    .push_bind(row.explanation());
            });
            let inserted = builder.build().execute(&mut *tx).await?.rows_affected();

            if inserted != rows.len() as u64 {
                // Dropping the transaction rolls the session back.
                return Err(StoreError::Corrupt(format!(
                    "session {} snapshot wrote {inserted} of {} rows",
                    created.id,
                    rows.len()
                )));
            }
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn find_session(&self, id: i64) -> Result<Option<Session>, StoreError> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn finish_session(&self, id: i64, at: DateTime<Utc>) -> Result<Session, StoreError> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "UPDATE sessions SET finished_at = COALESCE(finished_at, $2) WHERE id = $1 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(id)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }

    async fn list_snapshot_rows(&self, session_id: i64) -> Result<Vec<SnapshotRow>, StoreError> {
        let records = sqlx::query_as::<_, SnapshotRecord>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM quiz_answers WHERE session_id = $1 ORDER BY id"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        decode_rows(records)
    }

    async fn find_snapshot_row(
        &self,
        session_id: i64,
        row_id: i64,
    ) -> Result<Option<SnapshotRow>, StoreError> {
        let record = sqlx::query_as::<_, SnapshotRecord>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM quiz_answers WHERE id = $1 AND session_id = $2"
        ))
        .bind(row_id)
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) => Ok(decode_rows(vec![record])?.pop()),
            None => Ok(None),
        }
    }

    async fn set_chosen_option(
        &self,
        session_id: i64,
        row_id: i64,
        letter: Option<OptionLetter>,
        now: DateTime<Utc>,
    ) -> Result<AnswerWrite, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE quiz_answers SET chosen_option = $1
            WHERE id = $2 AND session_id = $3
              AND EXISTS (
                  SELECT 1 FROM sessions
                  WHERE id = $3 AND finished_at IS NULL AND deadline > $4
              )
            "#,
        )
        .bind(letter.map(OptionLetter::as_str))
        .bind(row_id)
        .bind(session_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(AnswerWrite::Written);
        }

        let row_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM quiz_answers WHERE id = $1 AND session_id = $2)",
        )
        .bind(row_id)
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(if row_exists { AnswerWrite::SessionFinished } else { AnswerWrite::RowMissing })
    }
}
