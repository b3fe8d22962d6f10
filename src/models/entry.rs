use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The recorded value of a chart entry. Exactly one variant is populated,
/// selected by the owning row's kind — the pairing is enforced at the type
/// level instead of five nullable columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryValue {
    Numeric { value: f64 },
    Choice { choice_id: String },
    Check { checked: bool },
    Text { text: String },
    Medication { amount: f64, unit: Option<String> },
}

/// One recorded observation for one row at one hour. At most one entry
/// exists per `(row_ref, at_time)`; re-saving the same cell is an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartEntry {
    pub id: Uuid,
    pub row_ref: Uuid,
    /// Always hour-normalized (minutes/seconds/fraction zeroed).
    pub at_time: NaiveDateTime,
    pub value: EntryValue,
    /// Independent of the value; cleared only when the entry is deleted.
    pub flagged: bool,
    pub author_ref: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Raw cell input as the frontend submits it. Numeric-ish kinds arrive as
/// strings and are parsed during validation; an empty string means "clear
/// the cell".
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryInput {
    Numeric { raw: String },
    Choice { choice_id: String },
    Check { checked: bool },
    Text { text: String },
    Medication { raw_amount: String, unit: Option<String> },
}

impl EntryInput {
    /// An empty submission clears the cell (numeric/option/text/medication).
    /// Check has no empty state — unchecking stores `false`.
    pub fn is_empty(&self) -> bool {
        match self {
            EntryInput::Numeric { raw } => raw.trim().is_empty(),
            EntryInput::Choice { choice_id } => choice_id.trim().is_empty(),
            EntryInput::Check { .. } => false,
            EntryInput::Text { text } => text.trim().is_empty(),
            EntryInput::Medication { raw_amount, .. } => raw_amount.trim().is_empty(),
        }
    }
}
