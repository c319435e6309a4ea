// src/models/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::question::OptionLetter;

/// Whether a session still accepts answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Finished,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaperOption {
    pub letter: OptionLetter,
    pub text: String,
}

/// A question as shown to the student during the exam (no answer key).
#[derive(Debug, Clone, Serialize)]
pub struct PaperQuestion {
    pub row_id: i64,
    pub position: usize,
    pub prompt: String,
    pub options: Vec<PaperOption>,
    pub chosen_option: Option<OptionLetter>,
}

/// The student's view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct ExamPaper {
    pub session_id: i64,
    pub status: SessionStatus,
    pub deadline: DateTime<Utc>,
    /// Advisory countdown; the server re-checks the deadline on every write.
    pub remaining_seconds: i64,
    pub answered: usize,
    pub total: usize,
    pub questions: Vec<PaperQuestion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Correct,
    Incorrect,
    Unanswered,
}

/// Correction of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionOutcome {
    pub row_id: i64,
    pub position: usize,
    pub prompt: String,
    pub status: AnswerStatus,
    pub chosen_option: Option<OptionLetter>,
    pub chosen_text: Option<String>,
    pub correct_option: OptionLetter,
    pub correct_text: String,
    pub explanation: Option<String>,
}

/// Final correction of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeReport {
    pub session_id: i64,
    pub score: usize,
    pub total: usize,
    pub elapsed_seconds: i64,
    pub finished_at: DateTime<Utc>,
    pub per_question: Vec<QuestionOutcome>,
}

/// DTO for recording an answer. `null` clears the answer.
#[derive(Debug, Deserialize)]
pub struct SetAnswerRequest {
    pub chosen_option: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BankSummary {
    pub class_code: String,
    pub question_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub class_code: String,
    pub imported: u64,
}
