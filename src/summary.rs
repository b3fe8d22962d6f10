//! End-of-stay aggregation: what was given, what was used, how long.
//!
//! Pure reductions over already-fetched collections — a stay's data volume
//! is bounded by hours × rows, so nothing here streams or paginates.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{ChartEntry, ChartRow, EntryValue, Hospitalization, MaterialUsage, RowKind};

/// Summed medication amounts, one bucket per (medication, unit) pair. The
/// unit is the one recorded at entry time — the catalog unit may have
/// changed since — and amounts recorded under different units are never
/// added together.
#[derive(Debug, Clone, Serialize)]
pub struct MedicationTotal {
    pub medication_ref: Option<Uuid>,
    pub label: String,
    pub total: f64,
    pub unit: Option<String>,
}

/// Summed material consumption for one material.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialTotal {
    pub material_ref: Uuid,
    pub label: String,
    pub total: f64,
    pub unit: Option<String>,
}

/// Stay length in whole days plus leftover whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StayDuration {
    pub days: i64,
    pub hours: i64,
}

/// Everything the end-of-stay report needs in one struct.
#[derive(Debug, Clone, Serialize)]
pub struct StaySummary {
    pub medication_totals: Vec<MedicationTotal>,
    pub material_totals: Vec<MaterialTotal>,
    pub duration: StayDuration,
}

/// Sum recorded medication amounts across the stay's entries, grouped by
/// medication and recording unit. An entry saved without an explicit unit
/// falls back to its row's unit; the row label names the medication.
pub fn medication_totals(rows: &[ChartRow], entries: &[ChartEntry]) -> Vec<MedicationTotal> {
    let med_rows: HashMap<Uuid, &ChartRow> = rows
        .iter()
        .filter(|r| r.kind == RowKind::Medication)
        .map(|r| (r.id, r))
        .collect();

    let mut buckets: HashMap<(Option<Uuid>, Option<String>), MedicationTotal> = HashMap::new();
    for entry in entries {
        let EntryValue::Medication { amount, ref unit } = entry.value else {
            continue;
        };
        let Some(row) = med_rows.get(&entry.row_ref) else {
            continue;
        };
        let unit = unit.clone().or_else(|| row.unit.clone());
        let key = (row.medication_ref, unit.clone());
        buckets
            .entry(key)
            .or_insert_with(|| MedicationTotal {
                medication_ref: row.medication_ref,
                label: row.label.clone(),
                total: 0.0,
                unit,
            })
            .total += amount;
    }

    let mut totals: Vec<MedicationTotal> = buckets.into_values().collect();
    totals.sort_by(|a, b| (&a.label, &a.unit).cmp(&(&b.label, &b.unit)));
    totals
}

/// Sum per-stay material consumption, grouped by material and unit.
pub fn material_totals(usages: &[MaterialUsage]) -> Vec<MaterialTotal> {
    let mut buckets: HashMap<(Uuid, Option<String>), MaterialTotal> = HashMap::new();
    for usage in usages {
        buckets
            .entry((usage.material_ref, usage.unit.clone()))
            .or_insert_with(|| MaterialTotal {
                material_ref: usage.material_ref,
                label: usage.material_name.clone(),
                total: 0.0,
                unit: usage.unit.clone(),
            })
            .total += usage.quantity;
    }

    let mut totals: Vec<MaterialTotal> = buckets.into_values().collect();
    totals.sort_by(|a, b| (&a.label, &a.unit).cmp(&(&b.label, &b.unit)));
    totals
}

/// Whole-hour stay length split into days and leftover hours. A span that
/// has not reached a full hour counts as zero.
pub fn stay_duration(admission_at: NaiveDateTime, end: NaiveDateTime) -> StayDuration {
    let total_hours = (end - admission_at).num_hours().max(0);
    StayDuration {
        days: total_hours / 24,
        hours: total_hours % 24,
    }
}

/// Assemble the full stay summary.
pub fn summarize(
    hospitalization: &Hospitalization,
    rows: &[ChartRow],
    entries: &[ChartEntry],
    usages: &[MaterialUsage],
    now: NaiveDateTime,
) -> StaySummary {
    let end = hospitalization.end_instant(now);
    StaySummary {
        medication_totals: medication_totals(rows, entries),
        material_totals: material_totals(usages),
        duration: stay_duration(hospitalization.admission_at, end),
    }
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

    fn med_row(label: &str, unit: &str) -> ChartRow {
        ChartRow {
            id: Uuid::new_v4(),
            hospitalization_ref: Uuid::new_v4(),
            kind: RowKind::Medication,
            label: label.into(),
            unit: Some(unit.into()),
            sort_order: 0,
            medication_ref: Some(Uuid::new_v4()),
            options: Vec::new(),
            created_at: at(1, 0),
        }
    }

    fn med_entry(row: &ChartRow, hour: u32, amount: f64, unit: Option<&str>) -> ChartEntry {
        ChartEntry {
            id: Uuid::new_v4(),
            row_ref: row.id,
            at_time: at(1, hour),
            value: EntryValue::Medication {
                amount,
                unit: unit.map(Into::into),
            },
            flagged: false,
            author_ref: Uuid::new_v4(),
            created_at: at(1, hour),
            updated_at: at(1, hour),
        }
    }

    #[test]
    fn medication_amounts_sum_per_medication() {
        let row = med_row("Flunixin", "ml");
        let entries = vec![
            med_entry(&row, 8, 5.0, Some("ml")),
            med_entry(&row, 14, 5.0, Some("ml")),
            med_entry(&row, 20, 2.5, Some("ml")),
        ];
        let totals = medication_totals(&[row.clone()], &entries);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].medication_ref, row.medication_ref);
        assert!((totals[0].total - 12.5).abs() < 1e-9);
        assert_eq!(totals[0].unit.as_deref(), Some("ml"));
    }

    #[test]
    fn different_units_stay_separate() {
        let row = med_row("Penicillin", "ml");
        let entries = vec![
            med_entry(&row, 8, 10.0, Some("ml")),
            med_entry(&row, 14, 500.0, Some("mg")),
        ];
        let totals = medication_totals(&[row], &entries);
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn entry_without_unit_falls_back_to_row_unit() {
        let row = med_row("Flunixin", "ml");
        let entries = vec![med_entry(&row, 8, 3.0, None)];
        let totals = medication_totals(&[row], &entries);
        assert_eq!(totals[0].unit.as_deref(), Some("ml"));
    }

    #[test]
    fn non_medication_entries_are_ignored() {
        let row = med_row("Flunixin", "ml");
        let mut temp_entry = med_entry(&row, 8, 1.0, None);
        temp_entry.value = EntryValue::Numeric { value: 38.0 };
        assert!(medication_totals(&[row], &[temp_entry]).is_empty());
    }

    #[test]
    fn totals_sort_by_label() {
        let a = med_row("Flunixin", "ml");
        let b = med_row("Amoxicillin", "ml");
        let entries = vec![med_entry(&a, 8, 1.0, None), med_entry(&b, 8, 2.0, None)];
        let totals = medication_totals(&[a, b], &entries);
        assert_eq!(totals[0].label, "Amoxicillin");
        assert_eq!(totals[1].label, "Flunixin");
    }

    #[test]
    fn material_quantities_sum_per_material() {
        let gauze = Uuid::new_v4();
        let usages = vec![
            MaterialUsage {
                material_ref: gauze,
                material_name: "Gauze".into(),
                quantity: 4.0,
                unit: Some("pcs".into()),
            },
            MaterialUsage {
                material_ref: gauze,
                material_name: "Gauze".into(),
                quantity: 6.0,
                unit: Some("pcs".into()),
            },
            MaterialUsage {
                material_ref: Uuid::new_v4(),
                material_name: "Cannula".into(),
                quantity: 1.0,
                unit: None,
            },
        ];
        let totals = material_totals(&usages);
        assert_eq!(totals.len(), 2);
        let gauze_total = totals.iter().find(|t| t.material_ref == gauze).unwrap();
        assert!((gauze_total.total - 10.0).abs() < 1e-9);
    }

    #[test]
    fn duration_splits_days_and_hours() {
        let admission = at(1, 8);
        let end = admission + chrono::Duration::hours(26);
        assert_eq!(
            stay_duration(admission, end),
            StayDuration { days: 1, hours: 2 }
        );
    }

    #[test]
    fn duration_floors_partial_hours() {
        let admission = at(1, 8);
        let end = at(1, 9) + chrono::Duration::minutes(59);
        assert_eq!(
            stay_duration(admission, end),
            StayDuration { days: 0, hours: 1 }
        );
    }

    #[test]
    fn duration_never_negative() {
        assert_eq!(
            stay_duration(at(2, 0), at(1, 0)),
            StayDuration { days: 0, hours: 0 }
        );
    }

    #[test]
    fn summarize_uses_archival_end_for_archived_stays() {
        let hosp = Hospitalization {
            id: Uuid::new_v4(),
            patient_ref: Uuid::new_v4(),
            admission_at: at(1, 8),
            weight_kg: None,
            archived_at: Some(at(2, 10)),
        };
        let summary = summarize(&hosp, &[], &[], &[], at(5, 0));
        assert_eq!(summary.duration, StayDuration { days: 1, hours: 2 });
    }
}
