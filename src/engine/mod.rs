// src/engine/mod.rs

//! Quiz session engine: sampling, exam snapshots, the authoritative deadline,
//! answer recording and grading.
//!
//! Every operation takes an explicit [`SessionContext`]; the engine keeps no
//! per-student state of its own and reads the clock on every call.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::{
    models::session::{Session, SessionContext},
    store::QuizStore,
};

pub mod answers;
pub mod deadline;
pub mod error;
pub mod grading;
pub mod paper;
pub mod sampler;
pub mod session;

pub use error::QuizError;

/// Source of "now" for deadline checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Entry point for all session operations.
#[derive(Clone)]
pub struct QuizEngine {
    store: Arc<dyn QuizStore>,
    clock: Arc<dyn Clock>,
}

impl QuizEngine {
    pub fn new(store: Arc<dyn QuizStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &dyn QuizStore {
        self.store.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Number of bank entries a session in `class_code` can draw from.
    pub async fn bank_size(&self, class_code: &str) -> Result<i64, QuizError> {
        Ok(self.store.count_questions(class_code).await?)
    }

    /// Loads the session `ctx` points at. Sessions of other students are
    /// reported as missing.
    async fn load_owned(&self, ctx: &SessionContext) -> Result<Session, QuizError> {
        match self.store.find_session(ctx.session_id).await? {
            Some(session) if session.student_id == ctx.student_id => Ok(session),
            Some(_) => {
                tracing::warn!(
                    session_id = ctx.session_id,
                    student_id = ctx.student_id,
                    "Session requested by a student who does not own it"
                );
                Err(QuizError::SessionNotFound(ctx.session_id))
            }
            None => Err(QuizError::SessionNotFound(ctx.session_id)),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::{ManualClock, QuizEngine};
    use crate::{
        models::{question::QuestionBankEntry, student::Student},
        store::{MemoryQuizStore, QuizStore},
    };

    pub(crate) const CLASS: &str = "CDS2026";

    pub(crate) struct Harness {
        pub(crate) engine: QuizEngine,
        pub(crate) store: Arc<MemoryQuizStore>,
        pub(crate) clock: Arc<ManualClock>,
    }

    impl Harness {
        pub(crate) async fn student(&self, name: &str) -> Student {
            self.store.upsert_student(CLASS, name).await.unwrap()
        }
    }

    /// Question `i` has correct option A, B or C in rotation and no option D.
    pub(crate) fn bank_entry(i: i64) -> QuestionBankEntry {
        let correct = ["A", "B", "C"][(i % 3) as usize];
        QuestionBankEntry {
            id: 0,
            prompt: format!("Domanda {i}"),
            option_a: format!("risposta a{i}"),
            option_b: format!("risposta b{i}"),
            option_c: format!("risposta c{i}"),
            option_d: String::new(),
            correct_option: correct.to_string(),
            explanation: if i % 2 == 0 { format!("spiegazione {i}") } else { String::new() },
        }
    }

    pub(crate) async fn harness(bank_size: i64) -> Harness {
        let store = Arc::new(MemoryQuizStore::new());
        for i in 0..bank_size {
            store.insert_raw_question(CLASS, bank_entry(i)).await;
        }
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        ));
        let engine = QuizEngine::new(store.clone(), clock.clone());
        Harness { engine, store, clock }
    }
}
