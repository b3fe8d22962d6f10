//! Schedule trigger evaluation.
//!
//! `triggers_at` is a pure function of one schedule and one candidate hour;
//! the grid calls it once per (row, hour) cell while rendering, so it must
//! stay free of I/O and allocation. Creation-time validation lives here too:
//! malformed parameters are rejected before any store call and never reach
//! the evaluator.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::ChartError;
use crate::models::{ChartRow, EntryValue, RowKind, Schedule, ScheduleInput};
use crate::timegrid::normalize_hour;

/// Does `schedule` fire at candidate hour `h`?
///
/// `h` must already be hour-normalized (grid axis instants always are).
/// One-time schedules (`interval_minutes == 0`) fire exactly at their
/// normalized start. Recurring schedules fire on every interval boundary
/// from the start, stopping after `end_at` and/or once the occurrence cap
/// is spent — whichever stop condition cuts off first wins.
pub fn triggers_at(schedule: &Schedule, h: NaiveDateTime) -> bool {
    let start = normalize_hour(schedule.start_at);

    if schedule.is_one_time() {
        return h == start;
    }

    if h < start {
        return false;
    }

    let elapsed = (h - start).num_minutes();
    if elapsed % schedule.interval_minutes != 0 {
        return false;
    }

    if let Some(end_at) = schedule.end_at {
        if h > end_at {
            return false;
        }
    } else if let Some(occurrences) = schedule.occurrences {
        // 1-based index of this boundary; a cap of 0 never fires.
        let occurrence_index = elapsed / schedule.interval_minutes + 1;
        if occurrence_index > i64::from(occurrences) {
            return false;
        }
    }

    true
}

/// Is the row expected to be filled in at `h`? Logical OR across all of the
/// row's schedules — rows may carry several overlapping ones.
pub fn is_row_scheduled_at(schedules: &[Schedule], row_id: Uuid, h: NaiveDateTime) -> bool {
    schedules
        .iter()
        .filter(|s| s.row_ref == row_id)
        .any(|s| triggers_at(s, h))
}

/// Pre-fill value for a scheduled cell: the default of the first schedule
/// firing at `h`, if it declares one.
pub fn prefill_at<'a>(
    schedules: &'a [Schedule],
    row_id: Uuid,
    h: NaiveDateTime,
) -> Option<&'a EntryValue> {
    schedules
        .iter()
        .filter(|s| s.row_ref == row_id && triggers_at(s, h))
        .find_map(|s| s.default_value.as_ref())
}

/// Reject malformed schedule parameters before anything is written.
pub fn validate_schedule(input: &ScheduleInput, row: &ChartRow) -> Result<(), ChartError> {
    if input.interval_minutes < 0 {
        return Err(ChartError::validation(format!(
            "interval must not be negative (got {})",
            input.interval_minutes
        )));
    }

    if let Some(occurrences) = input.occurrences {
        if occurrences <= 0 {
            return Err(ChartError::validation(format!(
                "occurrence cap must be positive (got {occurrences})"
            )));
        }
    }

    if let Some(ref default) = input.default_value {
        validate_default_value(default, row)?;
    }

    Ok(())
}

/// The schedule default must match the row's kind, and a Choice default
/// must name a declared option.
fn validate_default_value(value: &EntryValue, row: &ChartRow) -> Result<(), ChartError> {
    let matches_kind = matches!(
        (value, row.kind),
        (EntryValue::Numeric { .. }, RowKind::Numeric)
            | (EntryValue::Choice { .. }, RowKind::Option)
            | (EntryValue::Check { .. }, RowKind::Check)
            | (EntryValue::Text { .. }, RowKind::Text)
            | (EntryValue::Medication { .. }, RowKind::Medication)
    );
    if !matches_kind {
        return Err(ChartError::validation(format!(
            "default value does not match row kind {}",
            row.kind.as_str()
        )));
    }
    if let EntryValue::Choice { choice_id } = value {
        if !row.has_choice(choice_id) {
            return Err(ChartError::validation(format!(
                "'{choice_id}' is not a declared option of this row"
            )));
        }
    }
    Ok(())
}
