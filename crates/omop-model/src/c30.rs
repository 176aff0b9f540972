//! EORTC QLQ-C30 questionnaire responses.
//!
//! The questionnaire has thirty numbered items, each with a free-text answer
//! and a numeric answer code. They are kept in fixed-size arrays indexed by
//! question number; every write goes through the same validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::record::{Field, Record};

/// Number of questionnaire items.
pub const C30_QUESTION_COUNT: usize = 30;

/// Items 29 and 30 (global health status) use a 1..=7 scale, the rest 1..=4.
const GLOBAL_HEALTH_FIRST_QUESTION: usize = 29;

/// One completed questionnaire.
///
/// Deserialization goes through the same setters as programmatic writes, so
/// an out-of-range answer code in patient JSON is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawC30")]
pub struct C30 {
    /// Date the questionnaire was filled in.
    pub date: Option<NaiveDate>,
    /// Study event the questionnaire belongs to.
    pub event_name: Option<String>,
    answers: [Option<String>; C30_QUESTION_COUNT],
    codes: [Option<i64>; C30_QUESTION_COUNT],
}

/// Serialized shape of [`C30`] before validation.
#[derive(Deserialize)]
struct RawC30 {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    event_name: Option<String>,
    #[serde(default)]
    answers: [Option<String>; C30_QUESTION_COUNT],
    #[serde(default)]
    codes: [Option<i64>; C30_QUESTION_COUNT],
}

impl TryFrom<RawC30> for C30 {
    type Error = ModelError;

    fn try_from(raw: RawC30) -> Result<Self> {
        let mut c30 = C30::new(raw.date, raw.event_name);
        for (idx, answer) in raw.answers.iter().enumerate() {
            c30.set_answer(idx + 1, answer.as_deref())?;
        }
        for (idx, code) in raw.codes.into_iter().enumerate() {
            c30.set_code(idx + 1, code)?;
        }
        Ok(c30)
    }
}

impl C30 {
    pub fn new(date: Option<NaiveDate>, event_name: Option<String>) -> Self {
        Self {
            date,
            event_name,
            ..Self::default()
        }
    }

    /// Answer text for a 1-based question number.
    pub fn answer(&self, question: usize) -> Result<Option<&str>> {
        let idx = question_index(question)?;
        Ok(self.answers[idx].as_deref())
    }

    pub fn code(&self, question: usize) -> Result<Option<i64>> {
        let idx = question_index(question)?;
        Ok(self.codes[idx])
    }

    /// Sets the answer text; blank answers are stored as missing.
    pub fn set_answer(&mut self, question: usize, answer: Option<&str>) -> Result<()> {
        let idx = question_index(question)?;
        self.answers[idx] = answer
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Ok(())
    }

    pub fn set_code(&mut self, question: usize, code: Option<i64>) -> Result<()> {
        let idx = question_index(question)?;
        self.codes[idx] = match code {
            Some(code) => Some(validate_code(question, code)?),
            None => None,
        };
        Ok(())
    }

    /// Number of questions with an answer code.
    pub fn answered_count(&self) -> usize {
        self.codes.iter().filter(|code| code.is_some()).count()
    }
}

fn question_index(question: usize) -> Result<usize> {
    if (1..=C30_QUESTION_COUNT).contains(&question) {
        Ok(question - 1)
    } else {
        Err(ModelError::InvalidQuestion {
            question,
            max: C30_QUESTION_COUNT,
        })
    }
}

fn validate_code(question: usize, code: i64) -> Result<i64> {
    let max = if question >= GLOBAL_HEALTH_FIRST_QUESTION {
        7
    } else {
        4
    };
    if (1..=max).contains(&code) {
        Ok(code)
    } else {
        Err(ModelError::InvalidAnswerCode {
            question,
            code,
            max,
        })
    }
}

/// Parses `q7` / `q7_code` attribute names into `(question, is_code)`.
fn parse_question_attr(name: &str) -> Option<(usize, bool)> {
    let rest = name.strip_prefix('q')?;
    let (number, is_code) = match rest.strip_suffix("_code") {
        Some(number) => (number, true),
        None => (rest, false),
    };
    let question: usize = number.parse().ok()?;
    question_index(question).ok()?;
    Some((question, is_code))
}

impl Record for C30 {
    fn record_name(&self) -> &'static str {
        "C30"
    }

    fn field(&self, name: &str) -> Option<Field<'_>> {
        match name {
            "date" => Some(Field::date(self.date)),
            "event_name" => Some(Field::text(&self.event_name)),
            _ => {
                let (question, is_code) = parse_question_attr(name)?;
                let idx = question - 1;
                if is_code {
                    Some(Field::int(self.codes[idx]))
                } else {
                    Some(Field::text(&self.answers[idx]))
                }
            }
        }
    }
}
