//! Hour-indexed view of one hospitalization's observation chart.
//!
//! The grid is rebuilt from a full store fetch after every mutation; within
//! one build, `(row, hour)` lookups are O(1). Assembly mirrors rendering:
//! for each row × hour the cell carries the recorded entry (if any),
//! whether a schedule expects a value there, and whether the hour predates
//! admission and is therefore read-only.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ChartError;
use crate::models::{
    ChartEntry, ChartRow, EntryInput, EntryValue, Hospitalization, RowKind, Schedule,
};
use crate::scheduling::{is_row_scheduled_at, prefill_at};
use crate::timegrid::{hours_between, hours_of_day, normalize_hour};

/// Full chart payload as fetched from the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub rows: Vec<ChartRow>,
    pub entries: Vec<ChartEntry>,
    pub schedules: Vec<Schedule>,
}

/// One cell of the rendered grid.
#[derive(Debug, Clone, Serialize)]
pub struct GridCell {
    pub entry: Option<ChartEntry>,
    pub is_scheduled: bool,
    /// Hours before admission are read-only; mutations against them fail.
    pub is_disabled: bool,
    /// Default value of a firing schedule, offered when the cell is empty.
    pub prefill: Option<EntryValue>,
}

/// One chart row with its cells, in hour order.
#[derive(Debug, Clone, Serialize)]
pub struct GridRowView {
    pub row: ChartRow,
    pub cells: Vec<GridCell>,
}

/// Rendered grid: the hour axis plus one view per row, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct ChartView {
    pub hours: Vec<NaiveDateTime>,
    pub rows: Vec<GridRowView>,
}

/// Indexed chart state for one hospitalization.
#[derive(Debug)]
pub struct ChartGrid {
    rows: Vec<ChartRow>,
    entries: Vec<ChartEntry>,
    schedules: Vec<Schedule>,
    index: HashMap<(Uuid, NaiveDateTime), usize>,
}

impl ChartGrid {
    /// Index a freshly fetched chart. Rows are sorted into display order
    /// (`sort_order`, ties by creation order). Entry timestamps are
    /// normalized defensively; the store should have done so already.
    pub fn new(data: ChartData) -> Self {
        let ChartData {
            mut rows,
            entries,
            schedules,
        } = data;

        rows.sort_by(|a, b| {
            (a.sort_order, a.created_at, a.id).cmp(&(b.sort_order, b.created_at, b.id))
        });

        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            index.insert((entry.row_ref, normalize_hour(entry.at_time)), i);
        }

        Self {
            rows,
            entries,
            schedules,
            index,
        }
    }

    pub fn rows(&self) -> &[ChartRow] {
        &self.rows
    }

    pub fn entries(&self) -> &[ChartEntry] {
        &self.entries
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn row(&self, id: Uuid) -> Option<&ChartRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn entry_at(&self, row_id: Uuid, hour: NaiveDateTime) -> Option<&ChartEntry> {
        self.index
            .get(&(row_id, normalize_hour(hour)))
            .map(|&i| &self.entries[i])
    }

    pub fn is_scheduled_at(&self, row_id: Uuid, hour: NaiveDateTime) -> bool {
        is_row_scheduled_at(&self.schedules, row_id, normalize_hour(hour))
    }

    /// One day of the chart: every row × the day's 24 hours.
    pub fn day_grid(&self, hospitalization: &Hospitalization, day: NaiveDate) -> ChartView {
        self.view_for_hours(hospitalization, hours_of_day(day))
    }

    /// The whole stay: every row × every hour from admission through `end`
    /// ("now" for active stays, archival time otherwise).
    pub fn stay_grid(&self, hospitalization: &Hospitalization, end: NaiveDateTime) -> ChartView {
        self.view_for_hours(
            hospitalization,
            hours_between(hospitalization.admission_at, end),
        )
    }

    fn view_for_hours(
        &self,
        hospitalization: &Hospitalization,
        hours: Vec<NaiveDateTime>,
    ) -> ChartView {
        let admission_hour = normalize_hour(hospitalization.admission_at);
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let cells = hours
                    .iter()
                    .map(|&h| {
                        let entry = self.entry_at(row.id, h).cloned();
                        let is_scheduled = is_row_scheduled_at(&self.schedules, row.id, h);
                        let prefill = if is_scheduled && entry.is_none() {
                            prefill_at(&self.schedules, row.id, h).cloned()
                        } else {
                            None
                        };
                        GridCell {
                            entry,
                            is_scheduled,
                            is_disabled: h < admission_hour,
                            prefill,
                        }
                    })
                    .collect();
                GridRowView {
                    row: row.clone(),
                    cells,
                }
            })
            .collect();

        ChartView { hours, rows }
    }
}

/// Parse and validate raw cell input against the row's kind. Numeric-ish
/// kinds must parse to a finite number; a choice must be one the row
/// declares. Kind mismatches and unparseable values fail fast, before any
/// store call.
pub fn parse_entry_value(row: &ChartRow, input: &EntryInput) -> Result<EntryValue, ChartError> {
    match (row.kind, input) {
        (RowKind::Numeric, EntryInput::Numeric { raw }) => {
            let value = parse_finite(raw)?;
            Ok(EntryValue::Numeric { value })
        }
        (RowKind::Option, EntryInput::Choice { choice_id }) => {
            if !row.has_choice(choice_id) {
                return Err(ChartError::validation(format!(
                    "'{choice_id}' is not a declared option of this row"
                )));
            }
            Ok(EntryValue::Choice {
                choice_id: choice_id.clone(),
            })
        }
        (RowKind::Check, EntryInput::Check { checked }) => {
            Ok(EntryValue::Check { checked: *checked })
        }
        (RowKind::Text, EntryInput::Text { text }) => Ok(EntryValue::Text { text: text.clone() }),
        (RowKind::Medication, EntryInput::Medication { raw_amount, unit }) => {
            let amount = parse_finite(raw_amount)?;
            Ok(EntryValue::Medication {
                amount,
                unit: unit.clone().or_else(|| row.unit.clone()),
            })
        }
        _ => Err(ChartError::validation(format!(
            "input does not match row kind {}",
            row.kind.as_str()
        ))),
    }
}

fn parse_finite(raw: &str) -> Result<f64, ChartError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ChartError::validation(format!("'{raw}' is not a finite number")))
}

/// Cell text for one entry, as a pure function of the row kind. Numeric and
/// medication amounts print bare (the caller appends the unit); a check
/// renders as a presence marker. A value that does not match the kind
/// renders empty rather than leaking a mismatched record.
pub fn display_value(kind: RowKind, entry: Option<&ChartEntry>) -> String {
    let Some(entry) = entry else {
        return String::new();
    };
    match (kind, &entry.value) {
        (RowKind::Numeric, EntryValue::Numeric { value }) => fmt_number(*value),
        (RowKind::Option, EntryValue::Choice { choice_id }) => choice_id.clone(),
        (RowKind::Check, EntryValue::Check { checked }) => {
            if *checked {
                "✓".to_string()
            } else {
                String::new()
            }
        }
        (RowKind::Text, EntryValue::Text { text }) => text.clone(),
        (RowKind::Medication, EntryValue::Medication { amount, .. }) => fmt_number(*amount),
        _ => String::new(),
    }
}

fn fmt_number(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn row(label: &str, sort_order: i32) -> ChartRow {
        ChartRow {
            id: Uuid::new_v4(),
            hospitalization_ref: Uuid::new_v4(),
            kind: RowKind::Numeric,
            label: label.into(),
            unit: Some("°C".into()),
            sort_order,
            medication_ref: None,
            options: Vec::new(),
            created_at: at(1, 0),
        }
    }

    fn entry(row_id: Uuid, hour: NaiveDateTime, value: f64) -> ChartEntry {
        ChartEntry {
            id: Uuid::new_v4(),
            row_ref: row_id,
            at_time: hour,
            value: EntryValue::Numeric { value },
            flagged: false,
            author_ref: Uuid::new_v4(),
            created_at: hour,
            updated_at: hour,
        }
    }

    fn stay(admission: NaiveDateTime) -> Hospitalization {
        Hospitalization {
            id: Uuid::new_v4(),
            patient_ref: Uuid::new_v4(),
            admission_at: admission,
            weight_kg: Some(500.0),
            archived_at: None,
        }
    }

    fn schedule(row_id: Uuid, start: NaiveDateTime, interval: i64) -> Schedule {
        Schedule {
            id: Uuid::new_v4(),
            row_ref: row_id,
            start_at: start,
            interval_minutes: interval,
            end_at: None,
            occurrences: None,
            default_value: None,
            created_by_ref: Uuid::new_v4(),
        }
    }

    #[test]
    fn entry_lookup_normalizes_the_hour() {
        let r = row("Temp", 0);
        let e = entry(r.id, at(1, 9), 38.2);
        let grid = ChartGrid::new(ChartData {
            rows: vec![r.clone()],
            entries: vec![e],
            schedules: vec![],
        });

        let mid_hour = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 45, 12)
            .unwrap();
        assert!(grid.entry_at(r.id, mid_hour).is_some());
        assert!(grid.entry_at(r.id, at(1, 10)).is_none());
    }

    #[test]
    fn rows_come_back_in_display_order() {
        let mut first = row("Pulse", 1);
        let mut second = row("Temp", 2);
        // Same sort_order resolves by creation order.
        second.sort_order = 1;
        first.created_at = at(1, 0);
        second.created_at = at(1, 1);
        let third = row("Notes", 0);

        let grid = ChartGrid::new(ChartData {
            rows: vec![second.clone(), first.clone(), third.clone()],
            entries: vec![],
            schedules: vec![],
        });
        let labels: Vec<&str> = grid.rows().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Notes", "Pulse", "Temp"]);
    }

    #[test]
    fn day_grid_marks_scheduled_and_disabled_cells() {
        let r = row("Temp", 0);
        let s = schedule(r.id, at(1, 8), 120);
        let hosp = stay(at(1, 6));
        let grid = ChartGrid::new(ChartData {
            rows: vec![r.clone()],
            entries: vec![],
            schedules: vec![s],
        });

        let view = grid.day_grid(&hosp, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(view.hours.len(), 24);
        let cells = &view.rows[0].cells;

        // Before admission: disabled regardless of schedule state.
        assert!(cells[5].is_disabled);
        assert!(!cells[6].is_disabled);
        // Schedule fires at 08:00, 10:00, ... but not 09:00.
        assert!(cells[8].is_scheduled);
        assert!(!cells[9].is_scheduled);
        assert!(cells[10].is_scheduled);
    }

    #[test]
    fn mid_hour_admission_keeps_its_own_hour_writable() {
        let r = row("Temp", 0);
        let admission = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(6, 40, 0)
            .unwrap();
        let grid = ChartGrid::new(ChartData {
            rows: vec![r],
            entries: vec![],
            schedules: vec![],
        });
        let view = grid.day_grid(&stay(admission), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let cells = &view.rows[0].cells;
        assert!(cells[5].is_disabled);
        assert!(!cells[6].is_disabled);
    }

    #[test]
    fn stay_grid_spans_admission_to_end() {
        let r = row("Temp", 0);
        let hosp = stay(at(1, 22));
        let grid = ChartGrid::new(ChartData {
            rows: vec![r.clone()],
            entries: vec![entry(r.id, at(2, 1), 37.9)],
            schedules: vec![],
        });

        let view = grid.stay_grid(&hosp, at(2, 3));
        assert_eq!(view.hours.len(), 6); // 22 23 00 01 02 03
        assert!(view.rows[0].cells[3].entry.is_some());
        assert!(view.rows[0].cells.iter().all(|c| !c.is_disabled));
    }

    #[test]
    fn prefill_appears_only_on_empty_scheduled_cells() {
        let r = row("Temp", 0);
        let mut s = schedule(r.id, at(1, 8), 60);
        s.default_value = Some(EntryValue::Numeric { value: 38.0 });
        let grid = ChartGrid::new(ChartData {
            rows: vec![r.clone()],
            entries: vec![entry(r.id, at(1, 8), 38.4)],
            schedules: vec![s],
        });

        let view = grid.day_grid(&stay(at(1, 0)), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let cells = &view.rows[0].cells;
        // Filled cell: no prefill. Empty scheduled cell: prefill offered.
        assert!(cells[8].prefill.is_none());
        assert_eq!(cells[9].prefill, Some(EntryValue::Numeric { value: 38.0 }));
        // Unscheduled hour before start: nothing.
        assert!(cells[7].prefill.is_none());
    }

    mod parsing {
        use super::*;
        use crate::models::RowChoice;

        fn row_of(kind: RowKind) -> ChartRow {
            let mut r = row("Any", 0);
            r.kind = kind;
            if kind == RowKind::Option {
                r.options = vec![RowChoice {
                    id: "bright".into(),
                    label: "Bright".into(),
                }];
            }
            r
        }

        #[test]
        fn numeric_parses_finite_values() {
            let value =
                parse_entry_value(&row_of(RowKind::Numeric), &EntryInput::Numeric {
                    raw: " 38.4 ".into(),
                })
                .unwrap();
            assert_eq!(value, EntryValue::Numeric { value: 38.4 });
        }

        #[test]
        fn numeric_rejects_garbage_and_non_finite() {
            for raw in ["abc", "", "NaN", "inf"] {
                let result = parse_entry_value(&row_of(RowKind::Numeric), &EntryInput::Numeric {
                    raw: raw.into(),
                });
                assert!(result.is_err(), "{raw:?} should not parse");
            }
        }

        #[test]
        fn choice_must_be_declared() {
            let row = row_of(RowKind::Option);
            assert!(parse_entry_value(&row, &EntryInput::Choice {
                choice_id: "bright".into(),
            })
            .is_ok());
            assert!(parse_entry_value(&row, &EntryInput::Choice {
                choice_id: "dull".into(),
            })
            .is_err());
        }

        #[test]
        fn kind_mismatch_is_a_validation_error() {
            let err = parse_entry_value(&row_of(RowKind::Check), &EntryInput::Text {
                text: "hello".into(),
            })
            .unwrap_err();
            assert!(matches!(err, ChartError::Validation { .. }));
        }

        #[test]
        fn medication_amount_defaults_to_row_unit() {
            let mut row = row_of(RowKind::Medication);
            row.unit = Some("ml".into());
            row.medication_ref = Some(Uuid::new_v4());
            let value = parse_entry_value(&row, &EntryInput::Medication {
                raw_amount: "2.5".into(),
                unit: None,
            })
            .unwrap();
            assert_eq!(
                value,
                EntryValue::Medication {
                    amount: 2.5,
                    unit: Some("ml".into())
                }
            );
        }
    }

    mod display {
        use super::*;

        fn entry_with(value: EntryValue) -> ChartEntry {
            ChartEntry {
                id: Uuid::new_v4(),
                row_ref: Uuid::new_v4(),
                at_time: at(1, 8),
                value,
                flagged: false,
                author_ref: Uuid::new_v4(),
                created_at: at(1, 8),
                updated_at: at(1, 8),
            }
        }

        #[test]
        fn numeric_prints_bare_number() {
            let e = entry_with(EntryValue::Numeric { value: 38.5 });
            assert_eq!(display_value(RowKind::Numeric, Some(&e)), "38.5");
        }

        #[test]
        fn empty_cell_prints_nothing() {
            assert_eq!(display_value(RowKind::Numeric, None), "");
        }

        #[test]
        fn check_prints_presence_marker() {
            let yes = entry_with(EntryValue::Check { checked: true });
            let no = entry_with(EntryValue::Check { checked: false });
            assert_eq!(display_value(RowKind::Check, Some(&yes)), "✓");
            assert_eq!(display_value(RowKind::Check, Some(&no)), "");
        }

        #[test]
        fn medication_prints_amount_without_unit() {
            let e = entry_with(EntryValue::Medication {
                amount: 2.5,
                unit: Some("ml".into()),
            });
            assert_eq!(display_value(RowKind::Medication, Some(&e)), "2.5");
        }

        #[test]
        fn mismatched_value_renders_empty() {
            let e = entry_with(EntryValue::Text {
                text: "stray".into(),
            });
            assert_eq!(display_value(RowKind::Numeric, Some(&e)), "");
        }
    }
}
