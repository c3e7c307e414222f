use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BoardError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quadrant {
    Do,
    Schedule,
    Delegate,
    Drop,
}

impl Quadrant {
    /// Display order: top-left, top-right, bottom-left, bottom-right.
    pub const ALL: [Self; 4] = [Self::Do, Self::Schedule, Self::Delegate, Self::Drop];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Do => "do",
            Self::Schedule => "schedule",
            Self::Delegate => "delegate",
            Self::Drop => "drop",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Do => "Do now",
            Self::Schedule => "Schedule",
            Self::Delegate => "Delegate",
            Self::Drop => "Drop",
        }
    }

    pub const fn subtitle(self) -> &'static str {
        match self {
            Self::Do => "urgent, important",
            Self::Schedule => "important, not urgent",
            Self::Delegate => "urgent, not important",
            Self::Drop => "neither",
        }
    }

    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Do),
            2 => Some(Self::Schedule),
            3 => Some(Self::Delegate),
            4 => Some(Self::Drop),
            _ => None,
        }
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::Do => 1,
            Self::Schedule => 2,
            Self::Delegate => 3,
            Self::Drop => 4,
        }
    }

    pub const fn index(self) -> usize {
        self.number() as usize - 1
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Do => Self::Schedule,
            Self::Schedule => Self::Delegate,
            Self::Delegate => Self::Drop,
            Self::Drop => Self::Do,
        }
    }

    pub const fn prev(self) -> Self {
        match self {
            Self::Do => Self::Drop,
            Self::Schedule => Self::Do,
            Self::Delegate => Self::Schedule,
            Self::Drop => Self::Delegate,
        }
    }

    // Grid neighbours in the 2x2 layout. Moving off an edge stays put.

    pub const fn left(self) -> Self {
        match self {
            Self::Schedule => Self::Do,
            Self::Drop => Self::Delegate,
            other => other,
        }
    }

    pub const fn right(self) -> Self {
        match self {
            Self::Do => Self::Schedule,
            Self::Delegate => Self::Drop,
            other => other,
        }
    }

    pub const fn up(self) -> Self {
        match self {
            Self::Delegate => Self::Do,
            Self::Drop => Self::Schedule,
            other => other,
        }
    }

    pub const fn down(self) -> Self {
        match self {
            Self::Do => Self::Delegate,
            Self::Schedule => Self::Drop,
            other => other,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Quadrant {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|q| q.key() == s)
            .ok_or_else(|| BoardError::UnknownQuadrant(s.to_string()))
    }
}

/// A single task card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    /// Stored as `YYYY-MM-DD`, or an empty string when unset.
    #[serde(default, with = "due_format")]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub done: bool,
}

impl Task {
    pub fn new(title: String, notes: String, due: Option<NaiveDate>) -> Self {
        Self {
            id: new_id(),
            title,
            notes,
            due,
            done: false,
        }
    }
}

/// User-entered fields for creating or editing a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub notes: String,
    pub due: Option<NaiveDate>,
}

#[cfg(test)]
impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    #[must_use]
    pub const fn with_due(mut self, due: NaiveDate) -> Self {
        self.due = Some(due);
        self
    }
}

/// Short id: six random base36 chars followed by the last four of the clock in ms.
pub fn new_id() -> String {
    let random = base36(Uuid::new_v4().as_u128());
    let millis = base36(u128::from(Utc::now().timestamp_millis().unsigned_abs()));
    let head: String = random.chars().take(6).collect();
    let tail: String = millis
        .chars()
        .skip(millis.len().saturating_sub(4))
        .collect();
    head + &tail
}

fn base36(mut n: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(char::from(DIGITS[(n % 36) as usize]));
        n /= 36;
    }
    out.iter().rev().collect()
}

/// Parse a due date field. Blank input means no date.
pub fn parse_due(input: &str) -> Result<Option<NaiveDate>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| BoardError::InvalidDate(trimmed.to_string()))
}

pub fn format_due(due: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(due) = due else {
        return String::new();
    };
    let diff = (due - today).num_days();
    match diff {
        d if d < 0 => {
            let days = d.unsigned_abs();
            format!("Overdue by {days} day{}", if days == 1 { "" } else { "s" })
        }
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        d => format!("Due in {d} days"),
    }
}

/// Secondary line under a task title: due description and notes.
pub fn meta_line(task: &Task, today: NaiveDate) -> String {
    [format_due(task.due, today), task.notes.clone()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" • ")
}

mod due_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(due: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match due {
            Some(date) => s.serialize_str(&date.format(DATE_FORMAT).to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
