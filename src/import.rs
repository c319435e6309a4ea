// src/import.rs

//! Teacher bulk upload of question bank rows from CSV.

use csv::{ReaderBuilder, StringRecord};

use crate::{
    models::question::{NewQuestion, OptionLetter, OptionSet},
    utils::html::clean_html,
};

const REQUIRED_COLUMNS: [&str; 6] = [
    "question_text",
    "option_a",
    "option_b",
    "option_c",
    "option_d",
    "correct_option",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("the file is empty")]
    Empty,

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("{} invalid rows: {}", .0.len(), .0.join("; "))]
    InvalidRows(Vec<String>),

    #[error("malformed CSV: {0}")]
    Malformed(String),
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::Malformed(err.to_string())
    }
}

struct Columns {
    question_text: usize,
    option_a: usize,
    option_b: usize,
    option_c: usize,
    option_d: usize,
    correct_option: usize,
    explanation: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, ImportError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let missing: Vec<String> = REQUIRED_COLUMNS
            .into_iter()
            .filter(|c| find(*c).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        let required = |name: &str| {
            find(name).ok_or_else(|| ImportError::MissingColumns(vec![name.to_string()]))
        };
        Ok(Self {
            question_text: required("question_text")?,
            option_a: required("option_a")?,
            option_b: required("option_b")?,
            option_c: required("option_c")?,
            option_d: required("option_d")?,
            correct_option: required("correct_option")?,
            explanation: find("explanation"),
        })
    }
}

fn field(record: &StringRecord, idx: usize) -> String {
    record.get(idx).map(|v| clean_html(v.trim())).unwrap_or_default()
}

fn parse_row(columns: &Columns, record: &StringRecord) -> Result<NewQuestion, String> {
    let prompt = field(record, columns.question_text);
    if prompt.is_empty() {
        return Err("question_text is empty".to_string());
    }

    let options = OptionSet {
        option_a: field(record, columns.option_a),
        option_b: field(record, columns.option_b),
        option_c: field(record, columns.option_c),
        option_d: field(record, columns.option_d),
    };

    let raw_letter = record
        .get(columns.correct_option)
        .map(|v| v.trim())
        .unwrap_or_default();
    let correct_option = match raw_letter {
        "A" => OptionLetter::A,
        "B" => OptionLetter::B,
        "C" => OptionLetter::C,
        "D" => OptionLetter::D,
        other => return Err(format!("correct_option '{other}' must be one of A, B, C, D")),
    };

    if !options.has(correct_option) {
        return Err(format!(
            "correct_option is {correct_option} but option_{} is empty",
            correct_option.as_str().to_ascii_lowercase()
        ));
    }

    Ok(NewQuestion {
        prompt,
        options,
        correct_option,
        explanation: columns
            .explanation
            .map(|idx| field(record, idx))
            .unwrap_or_default(),
    })
}

/// Parses and validates a whole upload. Any invalid row rejects the file.
///
/// Rows may have fewer fields than the header; missing fields read as empty.
pub fn parse_question_csv(input: &str) -> Result<Vec<NewQuestion>, ImportError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(input.as_bytes());

    let header = reader.headers()?.clone();
    if header.is_empty() {
        return Err(ImportError::Empty);
    }
    let columns = Columns::from_header(&header)?;

    let mut questions = Vec::new();
    let mut errors = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        match parse_row(&columns, &record) {
            Ok(question) => questions.push(question),
            Err(reason) => errors.push(format!("line {line}: {reason}")),
        }
    }

    if !errors.is_empty() {
        return Err(ImportError::InvalidRows(errors));
    }
    if questions.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(questions)
}
