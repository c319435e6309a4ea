// src/models/question.rs

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

/// One of the four answer slots of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptionLetterError(pub String);

impl fmt::Display for ParseOptionLetterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not an option letter (A-D)", self.0)
    }
}

impl std::error::Error for ParseOptionLetterError {}

/// Case-insensitive, surrounding whitespace ignored.
impl FromStr for OptionLetter {
    type Err = ParseOptionLetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            _ => Err(ParseOptionLetterError(s.to_string())),
        }
    }
}

/// The four option texts of a question. Empty text means the slot is unused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
}

impl OptionSet {
    pub fn text(&self, letter: OptionLetter) -> &str {
        match letter {
            OptionLetter::A => &self.option_a,
            OptionLetter::B => &self.option_b,
            OptionLetter::C => &self.option_c,
            OptionLetter::D => &self.option_d,
        }
    }

    /// Whether `letter` points at an option with visible text.
    pub fn has(&self, letter: OptionLetter) -> bool {
        !self.text(letter).trim().is_empty()
    }

    /// Non-empty options in letter order.
    pub fn present(&self) -> impl Iterator<Item = (OptionLetter, &str)> + '_ {
        OptionLetter::ALL
            .into_iter()
            .filter(|l| self.has(*l))
            .map(|l| (l, self.text(l)))
    }

    /// Replacement for a correct option whose text is empty: the nearest
    /// non-empty letter below it, then above it.
    pub fn fallback_for(&self, letter: OptionLetter) -> Option<OptionLetter> {
        let idx = letter.index();
        let below = OptionLetter::ALL[..idx].iter().rev();
        let above = OptionLetter::ALL[idx + 1..].iter();
        below.chain(above).copied().find(|l| self.has(*l))
    }
}

/// Represents the 'question_bank' table in the database.
///
/// `correct_option` is kept as the raw stored text: rows can be written by
/// other tools, so nothing here assumes it was validated.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuestionBankEntry {
    pub id: i64,

    #[sqlx(rename = "question_text")]
    pub prompt: String,

    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,

    pub correct_option: String,

    /// Empty string when the question has no explanation.
    pub explanation: String,
}

impl QuestionBankEntry {
    pub fn options(&self) -> OptionSet {
        OptionSet {
            option_a: self.option_a.clone(),
            option_b: self.option_b.clone(),
            option_c: self.option_c.clone(),
            option_d: self.option_d.clone(),
        }
    }
}

/// A validated question ready to be appended to the bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub prompt: String,
    pub options: OptionSet,
    pub correct_option: OptionLetter,
    pub explanation: String,
}

/// DTO for creating a single question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 50))]
    pub class_code: String,
    #[validate(length(min = 1, max = 2000))]
    pub question_text: String,
    #[validate(length(min = 1, max = 1000))]
    pub option_a: String,
    #[validate(length(min = 1, max = 1000))]
    pub option_b: String,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub option_c: String,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub option_d: String,
    #[validate(custom(function = validate_letter))]
    pub correct_option: String,
    #[validate(length(max = 4000))]
    #[serde(default)]
    pub explanation: String,
}

fn validate_letter(letter: &str) -> Result<(), validator::ValidationError> {
    match letter {
        "A" | "B" | "C" | "D" => Ok(()),
        _ => Err(validator::ValidationError::new("correct_option_must_be_uppercase_a_to_d")),
    }
}

impl CreateQuestionRequest {
    /// Builds the bank row, checking that the correct option has text.
    pub fn into_new_question(self) -> Result<NewQuestion, String> {
        let correct_option: OptionLetter =
            self.correct_option.parse().map_err(|e: ParseOptionLetterError| e.to_string())?;
        let options = OptionSet {
            option_a: self.option_a,
            option_b: self.option_b,
            option_c: self.option_c,
            option_d: self.option_d,
        };
        if !options.has(correct_option) {
            return Err(format!("correct_option {correct_option} points at an empty option"));
        }
        Ok(NewQuestion {
            prompt: self.question_text,
            options,
            correct_option,
            explanation: self.explanation,
        })
    }
}
