// src/models/snapshot.rs

use sqlx::FromRow;

use super::question::{OptionLetter, OptionSet, QuestionBankEntry};

/// Broken snapshot invariant, detected when a row is built or decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotInvariantError {
    #[error("'{0}' is not an option letter")]
    BadLetter(String),
    #[error("correct option {0} has no text")]
    EmptyCorrectOption(OptionLetter),
    #[error("chosen option {0} has no text")]
    EmptyChosenOption(OptionLetter),
}

/// Raw 'quiz_answers' row as stored.
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotRecord {
    pub id: i64,
    pub session_id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: String,
    pub chosen_option: Option<String>,
    pub explanation: String,
}

/// Exam paper content for one sampled question, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnapshotRow {
    prompt: String,
    options: OptionSet,
    correct_option: OptionLetter,
    explanation: String,
}

impl NewSnapshotRow {
    /// Copies a bank entry into an exam row. The entry must already carry a
    /// correct option that points at non-empty text.
    pub fn from_entry(entry: &QuestionBankEntry) -> Result<Self, SnapshotInvariantError> {
        let correct_option: OptionLetter = entry
            .correct_option
            .parse()
            .map_err(|_| SnapshotInvariantError::BadLetter(entry.correct_option.clone()))?;
        let options = entry.options();
        if !options.has(correct_option) {
            return Err(SnapshotInvariantError::EmptyCorrectOption(correct_option));
        }
        Ok(Self {
            prompt: entry.prompt.clone(),
            options,
            correct_option,
            explanation: entry.explanation.clone(),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn correct_option(&self) -> OptionLetter {
        self.correct_option
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub(crate) fn into_row(self, id: i64, session_id: i64) -> SnapshotRow {
        SnapshotRow {
            id,
            session_id,
            prompt: self.prompt,
            options: self.options,
            correct_option: self.correct_option,
            chosen_option: None,
            explanation: self.explanation,
        }
    }
}

/// One question of a session's exam paper (a 'quiz_answers' row).
///
/// Content is fixed at creation; only the chosen option changes, and only
/// through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    id: i64,
    session_id: i64,
    prompt: String,
    options: OptionSet,
    correct_option: OptionLetter,
    chosen_option: Option<OptionLetter>,
    explanation: String,
}

impl SnapshotRow {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn session_id(&self) -> i64 {
        self.session_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn correct_option(&self) -> OptionLetter {
        self.correct_option
    }

    pub fn chosen_option(&self) -> Option<OptionLetter> {
        self.chosen_option
    }

    /// `None` when the question has no explanation.
    pub fn explanation(&self) -> Option<&str> {
        let text = self.explanation.trim();
        (!text.is_empty()).then_some(text)
    }

    /// Whether `letter` may be recorded as this row's answer.
    pub fn accepts(&self, letter: OptionLetter) -> bool {
        self.options.has(letter)
    }

    pub fn is_correct(&self) -> bool {
        self.chosen_option == Some(self.correct_option)
    }

    pub(crate) fn set_chosen(&mut self, letter: Option<OptionLetter>) {
        self.chosen_option = letter;
    }
}

impl TryFrom<SnapshotRecord> for SnapshotRow {
    type Error = SnapshotInvariantError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        let options = OptionSet {
            option_a: record.option_a,
            option_b: record.option_b,
            option_c: record.option_c,
            option_d: record.option_d,
        };

        let correct_option: OptionLetter = record
            .correct_option
            .parse()
            .map_err(|_| SnapshotInvariantError::BadLetter(record.correct_option.clone()))?;
        if !options.has(correct_option) {
            return Err(SnapshotInvariantError::EmptyCorrectOption(correct_option));
        }

        let chosen_option = match record.chosen_option.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let letter: OptionLetter = raw
                    .parse()
                    .map_err(|_| SnapshotInvariantError::BadLetter(raw.to_string()))?;
                if !options.has(letter) {
                    return Err(SnapshotInvariantError::EmptyChosenOption(letter));
                }
                Some(letter)
            }
        };

        Ok(Self {
            id: record.id,
            session_id: record.session_id,
            prompt: record.question_text,
            options,
            correct_option,
            chosen_option,
            explanation: record.explanation,
        })
    }
}
