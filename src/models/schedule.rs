use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry::EntryValue;

/// When a row is expected to be filled in: once (`interval_minutes == 0`)
/// or repeatedly at a fixed interval, optionally bounded by an end instant
/// and/or an occurrence cap. `end_at`/`occurrences` are meaningful only for
/// recurring schedules; when both are present they act as OR-of-stop-
/// conditions with `end_at` checked first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub row_ref: Uuid,
    pub start_at: NaiveDateTime,
    /// `0` encodes a one-time schedule. Never negative in stored data.
    pub interval_minutes: i64,
    pub end_at: Option<NaiveDateTime>,
    pub occurrences: Option<u32>,
    /// Pre-fillable value matching the row's kind.
    pub default_value: Option<EntryValue>,
    pub created_by_ref: Uuid,
}

impl Schedule {
    pub fn is_one_time(&self) -> bool {
        self.interval_minutes == 0
    }
}

/// Raw schedule parameters as submitted, validated before any store call.
/// Signed fields deliberately admit the malformed inputs the validator has
/// to reject (negative interval, zero/negative occurrence cap).
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInput {
    pub row_ref: Uuid,
    pub start_at: NaiveDateTime,
    pub interval_minutes: i64,
    pub end_at: Option<NaiveDateTime>,
    pub occurrences: Option<i64>,
    pub default_value: Option<EntryValue>,
}
