//! Mutation orchestration over the chart store.
//!
//! One service instance tracks one hospitalization. Every mutation follows
//! the same shape: validate locally (fail fast, nothing written on a
//! validation error), make a single store round trip, then re-fetch the
//! full chart. There is no incremental patching and no local conflict
//! resolution — the store arbitrates concurrent writes and the next fetch
//! reflects its decision.

use chrono::{Local, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::dosage::{self, RecommendedRange};
use crate::error::ChartError;
use crate::grid::{parse_entry_value, ChartGrid, ChartView};
use crate::models::{
    ChartEntry, ChartRow, EntryInput, Hospitalization, RowInput, RowKind, Schedule, ScheduleInput,
};
use crate::scheduling::validate_schedule;
use crate::store::ChartStore;
use crate::summary::{summarize, StaySummary};
use crate::timegrid::normalize_hour;

#[derive(Debug)]
pub struct ChartService<S> {
    store: S,
    hospitalization: Hospitalization,
    grid: ChartGrid,
}

impl<S: ChartStore> ChartService<S> {
    /// Load the stay context and the full chart for `hospitalization_id`.
    pub fn open(store: S, hospitalization_id: Uuid) -> Result<Self, ChartError> {
        let hospitalization = store.fetch_hospitalization(hospitalization_id)?;
        let chart = store.fetch_chart(hospitalization_id)?;
        tracing::debug!(
            hospitalization = %hospitalization_id,
            rows = chart.rows.len(),
            entries = chart.entries.len(),
            "chart loaded"
        );
        Ok(Self {
            store,
            hospitalization,
            grid: ChartGrid::new(chart),
        })
    }

    pub fn hospitalization(&self) -> &Hospitalization {
        &self.hospitalization
    }

    pub fn grid(&self) -> &ChartGrid {
        &self.grid
    }

    /// Re-fetch the full chart and rebuild the index. Called after every
    /// mutation; also usable by callers that suspect staleness.
    pub fn refresh(&mut self) -> Result<(), ChartError> {
        let chart = self.store.fetch_chart(self.hospitalization.id)?;
        self.grid = ChartGrid::new(chart);
        Ok(())
    }

    // ─── Views ───────────────────────────────────────────────────────────

    pub fn day_grid(&self, day: NaiveDate) -> ChartView {
        self.grid.day_grid(&self.hospitalization, day)
    }

    pub fn stay_grid(&self, now: NaiveDateTime) -> ChartView {
        self.grid
            .stay_grid(&self.hospitalization, self.hospitalization.end_instant(now))
    }

    /// End-of-stay report data: medication totals, material totals, stay
    /// duration.
    pub fn summarize(&self, now: NaiveDateTime) -> Result<StaySummary, ChartError> {
        let usages = self.store.fetch_material_usages(self.hospitalization.id)?;
        Ok(summarize(
            &self.hospitalization,
            self.grid.rows(),
            self.grid.entries(),
            &usages,
            now,
        ))
    }

    /// Absolute recommended dose range for a medication row, from the
    /// catalog's per-kg reference and the patient's weight. `None` when the
    /// row is not a medication row, the catalog has no reference, or the
    /// stay has no recorded weight.
    pub fn dose_reference(&self, row_id: Uuid) -> Result<Option<RecommendedRange>, ChartError> {
        let row = self.require_row(row_id)?;
        let (Some(medication_ref), Some(weight_kg)) =
            (row.medication_ref, self.hospitalization.weight_kg)
        else {
            return Ok(None);
        };
        let Some(medication) = self.store.fetch_medication(medication_ref)? else {
            return Ok(None);
        };
        Ok(dosage::recommended_range(&medication, weight_kg))
    }

    /// Volume equivalent of a per-kg mass dose for a medication row, using
    /// the catalog concentration. `None` whenever any input is missing —
    /// the caller keeps displaying mass.
    pub fn dose_volume(&self, row_id: Uuid, mass_per_kg: f64) -> Result<Option<f64>, ChartError> {
        let row = self.require_row(row_id)?;
        let (Some(medication_ref), Some(weight_kg)) =
            (row.medication_ref, self.hospitalization.weight_kg)
        else {
            return Ok(None);
        };
        let Some(medication) = self.store.fetch_medication(medication_ref)? else {
            return Ok(None);
        };
        Ok(dosage::convert_mass_to_volume(
            mass_per_kg,
            weight_kg,
            medication.concentration,
        ))
    }

    // ─── Entry mutations ─────────────────────────────────────────────────

    /// Save a cell. Creates the entry on first save, updates the value on
    /// re-save, and treats an empty submission as deletion. The flag and
    /// authorship history of an existing entry stay untouched.
    pub fn upsert_entry(
        &mut self,
        row_id: Uuid,
        hour: NaiveDateTime,
        input: &EntryInput,
        author_ref: Uuid,
    ) -> Result<(), ChartError> {
        let hour = normalize_hour(hour);
        let row = self.require_row(row_id)?.clone();
        self.require_writable(hour)?;

        if input.is_empty() {
            return self.delete_entry(row_id, hour);
        }

        let value = parse_entry_value(&row, input)?;
        let now = Local::now().naive_local();

        match self.grid.entry_at(row_id, hour) {
            Some(existing) => {
                let mut updated = existing.clone();
                updated.value = value;
                updated.updated_at = now;
                self.store.update_entry(&updated)?;
                tracing::info!(row = %row_id, %hour, "chart entry updated");
            }
            None => {
                let entry = ChartEntry {
                    id: Uuid::new_v4(),
                    row_ref: row_id,
                    at_time: hour,
                    value,
                    flagged: false,
                    author_ref,
                    created_at: now,
                    updated_at: now,
                };
                self.store.create_entry(&entry)?;
                tracing::info!(row = %row_id, %hour, "chart entry created");
            }
        }

        self.refresh()
    }

    /// Clear a cell. No-op when nothing is recorded there; deleting the
    /// entry also clears its flag, since the whole record disappears.
    pub fn delete_entry(&mut self, row_id: Uuid, hour: NaiveDateTime) -> Result<(), ChartError> {
        let hour = normalize_hour(hour);
        self.require_row(row_id)?;
        self.require_writable(hour)?;

        let Some(entry) = self.grid.entry_at(row_id, hour) else {
            return Ok(());
        };
        self.store.delete_entry(entry.id)?;
        tracing::info!(row = %row_id, %hour, "chart entry deleted");
        self.refresh()
    }

    /// Flip the flag on a recorded cell, leaving the value untouched. An
    /// empty cell cannot be flagged.
    pub fn toggle_flag(&mut self, row_id: Uuid, hour: NaiveDateTime) -> Result<(), ChartError> {
        let hour = normalize_hour(hour);
        self.require_row(row_id)?;
        self.require_writable(hour)?;

        let entry = self
            .grid
            .entry_at(row_id, hour)
            .ok_or_else(|| ChartError::not_found("chart_entry", format!("{row_id}@{hour}")))?;

        let mut updated = entry.clone();
        updated.flagged = !updated.flagged;
        updated.updated_at = Local::now().naive_local();
        self.store.update_entry(&updated)?;
        tracing::info!(row = %row_id, %hour, flagged = updated.flagged, "chart entry flag toggled");
        self.refresh()
    }

    // ─── Row mutations ───────────────────────────────────────────────────

    pub fn create_row(&mut self, input: RowInput) -> Result<Uuid, ChartError> {
        if (input.kind == RowKind::Medication) != input.medication_ref.is_some() {
            return Err(ChartError::validation(
                "medication reference is required for medication rows and \
                 forbidden for all others",
            ));
        }
        if input.label.trim().is_empty() {
            return Err(ChartError::validation("row label must not be empty"));
        }

        let row = ChartRow {
            id: Uuid::new_v4(),
            hospitalization_ref: self.hospitalization.id,
            kind: input.kind,
            label: input.label,
            unit: input.unit,
            sort_order: input.sort_order,
            medication_ref: input.medication_ref,
            options: input.options,
            created_at: Local::now().naive_local(),
        };
        self.store.create_row(&row)?;
        tracing::info!(row = %row.id, kind = row.kind.as_str(), "chart row created");
        self.refresh()?;
        Ok(row.id)
    }

    /// Delete a row; the store cascades to its entries and schedules.
    pub fn delete_row(&mut self, row_id: Uuid) -> Result<(), ChartError> {
        self.require_row(row_id)?;
        self.store.delete_row(row_id)?;
        tracing::info!(row = %row_id, "chart row deleted");
        self.refresh()
    }

    // ─── Schedule mutations ──────────────────────────────────────────────

    pub fn create_schedule(
        &mut self,
        input: ScheduleInput,
        created_by_ref: Uuid,
    ) -> Result<Uuid, ChartError> {
        let row = self.require_row(input.row_ref)?.clone();
        validate_schedule(&input, &row)?;

        let schedule = Schedule {
            id: Uuid::new_v4(),
            row_ref: input.row_ref,
            start_at: input.start_at,
            interval_minutes: input.interval_minutes,
            end_at: input.end_at,
            occurrences: input.occurrences.map(|o| o as u32),
            default_value: input.default_value,
            created_by_ref,
        };
        self.store.create_schedule(&schedule)?;
        tracing::info!(
            schedule = %schedule.id,
            row = %schedule.row_ref,
            interval_minutes = schedule.interval_minutes,
            "schedule created"
        );
        self.refresh()?;
        Ok(schedule.id)
    }

    pub fn delete_schedule(&mut self, schedule_id: Uuid) -> Result<(), ChartError> {
        if !self.grid.schedules().iter().any(|s| s.id == schedule_id) {
            return Err(ChartError::not_found("schedule", schedule_id));
        }
        self.store.delete_schedule(schedule_id)?;
        tracing::info!(schedule = %schedule_id, "schedule deleted");
        self.refresh()
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    fn require_row(&self, row_id: Uuid) -> Result<&ChartRow, ChartError> {
        self.grid
            .row(row_id)
            .ok_or_else(|| ChartError::not_found("chart_row", row_id))
    }

    /// Hours before admission are read-only, whatever the UI shows.
    fn require_writable(&self, hour: NaiveDateTime) -> Result<(), ChartError> {
        if hour < normalize_hour(self.hospitalization.admission_at) {
            tracing::warn!(%hour, "mutation rejected: before admission");
            return Err(ChartError::OutOfRange { hour });
        }
        Ok(())
    }
}
