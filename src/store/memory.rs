// src/store/memory.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{AnswerWrite, QuizStore, StoreError};
use crate::models::{
    question::{NewQuestion, OptionLetter, QuestionBankEntry},
    session::{NewSession, Session},
    snapshot::{NewSnapshotRow, SnapshotRow},
    student::Student,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    students: Vec<Student>,
    questions: BTreeMap<i64, (String, QuestionBankEntry)>,
    sessions: BTreeMap<i64, Session>,
    snapshot_rows: BTreeMap<i64, SnapshotRow>,
    /// Fails the next `create_session` after this many rows would be written.
    fail_snapshot_after: Option<usize>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process `QuizStore`. All writes of one call are applied together.
#[derive(Default)]
pub struct MemoryQuizStore {
    tables: Mutex<Tables>,
}

impl MemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next session start fail after `rows` exam rows were written.
    pub async fn fail_next_snapshot_after(&self, rows: usize) {
        self.tables.lock().await.fail_snapshot_after = Some(rows);
    }

    /// Inserts a bank row verbatim, skipping validation. Returns its id.
    pub async fn insert_raw_question(&self, class_code: &str, mut entry: QuestionBankEntry) -> i64 {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        entry.id = id;
        tables.questions.insert(id, (class_code.to_string(), entry));
        id
    }

    pub async fn session_count(&self) -> usize {
        self.tables.lock().await.sessions.len()
    }

    pub async fn snapshot_row_count(&self) -> usize {
        self.tables.lock().await.snapshot_rows.len()
    }
}

#[async_trait]
impl QuizStore for MemoryQuizStore {
    async fn upsert_student(
        &self,
        class_code: &str,
        display_name: &str,
    ) -> Result<Student, StoreError> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables
            .students
            .iter()
            .find(|s| s.class_code == class_code && s.display_name == display_name)
        {
            return Ok(existing.clone());
        }

        let student = Student {
            id: tables.next_id(),
            class_code: class_code.to_string(),
            display_name: display_name.to_string(),
        };
        tables.students.push(student.clone());
        Ok(student)
    }

    async fn find_student(&self, id: i64) -> Result<Option<Student>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.students.iter().find(|s| s.id == id).cloned())
    }

    async fn count_questions(&self, class_code: &str) -> Result<i64, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables.questions.values().filter(|(class, _)| class == class_code).count() as i64)
    }

    async fn list_questions(&self, class_code: &str) -> Result<Vec<QuestionBankEntry>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .questions
            .values()
            .filter(|(class, _)| class == class_code)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn insert_questions(
        &self,
        class_code: &str,
        questions: &[NewQuestion],
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        for q in questions {
            let id = tables.next_id();
            let entry = QuestionBankEntry {
                id,
                prompt: q.prompt.clone(),
                option_a: q.options.option_a.clone(),
                option_b: q.options.option_b.clone(),
                option_c: q.options.option_c.clone(),
                option_d: q.options.option_d.clone(),
                correct_option: q.correct_option.to_string(),
                explanation: q.explanation.clone(),
            };
            tables.questions.insert(id, (class_code.to_string(), entry));
        }
        Ok(questions.len() as u64)
    }

    async fn delete_question(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.lock().await.questions.remove(&id).is_some())
    }

    async fn create_session(
        &self,
        session: NewSession,
        rows: Vec<NewSnapshotRow>,
    ) -> Result<Session, StoreError> {
        let mut tables = self.tables.lock().await;
        let fail_after = tables.fail_snapshot_after.take();

        let created = Session {
            id: tables.next_id(),
            student_id: session.student_id,
            class_code: session.class_code,
            question_count: session.question_count,
            created_at: session.created_at,
            deadline: session.deadline,
            finished_at: None,
        };
        tables.sessions.insert(created.id, created.clone());

        let mut written = Vec::with_capacity(rows.len());
        for row in rows {
            if fail_after == Some(written.len()) {
                // Roll back everything this call wrote.
                for id in &written {
                    tables.snapshot_rows.remove(id);
                }
                tables.sessions.remove(&created.id);
                return Err(StoreError::Unavailable(format!(
                    "snapshot write interrupted after {} rows",
                    written.len()
                )));
            }
            let id = tables.next_id();
            tables.snapshot_rows.insert(id, row.into_row(id, created.id));
            written.push(id);
        }

        Ok(created)
    }

    async fn find_session(&self, id: i64) -> Result<Option<Session>, StoreError> {
        Ok(self.tables.lock().await.sessions.get(&id).cloned())
    }

    async fn finish_session(&self, id: i64, at: DateTime<Utc>) -> Result<Session, StoreError> {
        let mut tables = self.tables.lock().await;
        let session = tables
            .sessions
            .get_mut(&id)
            .ok_or_else(|| StoreError::Unavailable(format!("session {id} does not exist")))?;
        if session.finished_at.is_none() {
            session.finished_at = Some(at);
        }
        Ok(session.clone())
    }

    async fn list_snapshot_rows(&self, session_id: i64) -> Result<Vec<SnapshotRow>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .snapshot_rows
            .values()
            .filter(|row| row.session_id() == session_id)
            .cloned()
            .collect())
    }

    async fn find_snapshot_row(
        &self,
        session_id: i64,
        row_id: i64,
    ) -> Result<Option<SnapshotRow>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .snapshot_rows
            .get(&row_id)
            .filter(|row| row.session_id() == session_id)
            .cloned())
    }

    async fn set_chosen_option(
        &self,
        session_id: i64,
        row_id: i64,
        letter: Option<OptionLetter>,
        now: DateTime<Utc>,
    ) -> Result<AnswerWrite, StoreError> {
        let mut tables = self.tables.lock().await;

        let open = tables
            .sessions
            .get(&session_id)
            .is_some_and(|s| s.finished_at.is_none() && now < s.deadline);

        let Some(row) = tables
            .snapshot_rows
            .get_mut(&row_id)
            .filter(|row| row.session_id() == session_id)
        else {
            return Ok(AnswerWrite::RowMissing);
        };

        if !open {
            return Ok(AnswerWrite::SessionFinished);
        }

        row.set_chosen(letter);
        Ok(AnswerWrite::Written)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::models::snapshot::NewSnapshotRow;

    fn new_rows(n: i64) -> Vec<NewSnapshotRow> {
        (0..n)
            .map(|i| {
                let entry = QuestionBankEntry {
                    id: i,
                    prompt: format!("Domanda {i}"),
                    option_a: "a".into(),
                    option_b: "b".into(),
                    option_c: "c".into(),
                    option_d: String::new(),
                    correct_option: "A".into(),
                    explanation: String::new(),
                };
                NewSnapshotRow::from_entry(&entry).unwrap()
            })
            .collect()
    }

    fn new_session(student_id: i64, deadline: DateTime<Utc>) -> NewSession {
        NewSession {
            student_id,
            class_code: "CDS2026".into(),
            question_count: 3,
            created_at: deadline - Duration::minutes(10),
            deadline,
        }
    }

    #[tokio::test]
    async fn failed_start_rolls_back_rows_already_written() {
        let store = MemoryQuizStore::new();
        let deadline = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        store.fail_next_snapshot_after(2).await;

        let err = store.create_session(new_session(7, deadline), new_rows(3)).await;

        assert!(matches!(err, Err(StoreError::Unavailable(_))));
        assert_eq!(store.session_count().await, 0);
        assert_eq!(store.snapshot_row_count().await, 0);
    }

    #[tokio::test]
    async fn answer_write_is_refused_at_the_deadline() {
        let store = MemoryQuizStore::new();
        let deadline = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let session = store.create_session(new_session(7, deadline), new_rows(3)).await.unwrap();
        let row_id = store.list_snapshot_rows(session.id).await.unwrap()[0].id();

        let before = deadline - Duration::seconds(1);
        assert_eq!(
            store.set_chosen_option(session.id, row_id, Some(OptionLetter::B), before).await.unwrap(),
            AnswerWrite::Written
        );
        assert_eq!(
            store.set_chosen_option(session.id, row_id, Some(OptionLetter::C), deadline).await.unwrap(),
            AnswerWrite::SessionFinished
        );

        let row = store.find_snapshot_row(session.id, row_id).await.unwrap().unwrap();
        assert_eq!(row.chosen_option(), Some(OptionLetter::B));
    }

    #[tokio::test]
    async fn answer_write_reports_missing_rows() {
        let store = MemoryQuizStore::new();
        let deadline = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let session = store.create_session(new_session(7, deadline), new_rows(1)).await.unwrap();

        let result = store
            .set_chosen_option(session.id, 9_999, None, deadline - Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(result, AnswerWrite::RowMissing);
    }
}
