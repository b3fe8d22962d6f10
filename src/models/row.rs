use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of value a chart row records at each hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Numeric,
    Option,
    Check,
    Text,
    Medication,
}

impl RowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RowKind::Numeric => "numeric",
            RowKind::Option => "option",
            RowKind::Check => "check",
            RowKind::Text => "text",
            RowKind::Medication => "medication",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "numeric" => Some(RowKind::Numeric),
            "option" => Some(RowKind::Option),
            "check" => Some(RowKind::Check),
            "text" => Some(RowKind::Text),
            "medication" => Some(RowKind::Medication),
            _ => None,
        }
    }
}

/// One selectable choice declared on an Option row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowChoice {
    pub id: String,
    pub label: String,
}

/// One tracked clinical parameter for one hospitalization — a line in the
/// observation chart (temperature, heart rate, a named medication, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartRow {
    pub id: Uuid,
    pub hospitalization_ref: Uuid,
    pub kind: RowKind,
    pub label: String,
    /// Meaningful for Numeric and Medication rows only.
    pub unit: Option<String>,
    /// Display position; ties broken by creation order.
    pub sort_order: i32,
    /// Present iff `kind == Medication`.
    pub medication_ref: Option<Uuid>,
    /// Declared choices; meaningful for Option rows only.
    pub options: Vec<RowChoice>,
    pub created_at: NaiveDateTime,
}

impl ChartRow {
    /// Kind/reference pairing check: a medication reference belongs on
    /// Medication rows and on nothing else.
    pub fn is_consistent(&self) -> bool {
        (self.kind == RowKind::Medication) == self.medication_ref.is_some()
    }

    pub fn has_choice(&self, choice_id: &str) -> bool {
        self.options.iter().any(|c| c.id == choice_id)
    }
}

/// Raw parameters for creating a row, validated before the store call.
#[derive(Debug, Clone, Deserialize)]
pub struct RowInput {
    pub kind: RowKind,
    pub label: String,
    pub unit: Option<String>,
    pub sort_order: i32,
    pub medication_ref: Option<Uuid>,
    pub options: Vec<RowChoice>,
}
