//! In-process chart store.
//!
//! Test double and demo backend for the `ChartStore` seam. It plays the
//! arbiter role a real store has: at most one entry per `(row, hour)`
//! (concurrent creates for the same key coalesce into the latest write)
//! and row deletion cascades to entries and schedules.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::error::ChartError;
use crate::grid::ChartData;
use crate::models::{ChartEntry, ChartRow, Hospitalization, MaterialUsage, Medication, Schedule};
use crate::store::ChartStore;
use crate::timegrid::normalize_hour;

#[derive(Debug, Default)]
struct State {
    hospitalizations: HashMap<Uuid, Hospitalization>,
    rows: Vec<ChartRow>,
    entries: Vec<ChartEntry>,
    schedules: Vec<Schedule>,
    medications: HashMap<Uuid, Medication>,
    usages: HashMap<Uuid, Vec<MaterialUsage>>,
}

#[derive(Debug, Default)]
pub struct MemoryChartStore {
    state: Mutex<State>,
}

impl MemoryChartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeding helpers for tests and demos.
    pub fn insert_hospitalization(&self, hospitalization: Hospitalization) {
        let mut state = self.state.lock().expect("store lock poisoned");
        state
            .hospitalizations
            .insert(hospitalization.id, hospitalization);
    }

    pub fn insert_medication(&self, medication: Medication) {
        let mut state = self.state.lock().expect("store lock poisoned");
        state.medications.insert(medication.id, medication);
    }

    pub fn insert_material_usage(&self, hospitalization_id: Uuid, usage: MaterialUsage) {
        let mut state = self.state.lock().expect("store lock poisoned");
        state
            .usages
            .entry(hospitalization_id)
            .or_default()
            .push(usage);
    }

    fn lock_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> Result<T, ChartError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ChartError::Transport("store lock poisoned".into()))?;
        Ok(f(&mut state))
    }
}

impl ChartStore for MemoryChartStore {
    fn fetch_chart(&self, hospitalization_id: Uuid) -> Result<ChartData, ChartError> {
        self.lock_state(|state| {
            let rows: Vec<ChartRow> = state
                .rows
                .iter()
                .filter(|r| r.hospitalization_ref == hospitalization_id)
                .cloned()
                .collect();
            let row_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
            ChartData {
                entries: state
                    .entries
                    .iter()
                    .filter(|e| row_ids.contains(&e.row_ref))
                    .cloned()
                    .collect(),
                schedules: state
                    .schedules
                    .iter()
                    .filter(|s| row_ids.contains(&s.row_ref))
                    .cloned()
                    .collect(),
                rows,
            }
        })
    }

    fn fetch_hospitalization(&self, id: Uuid) -> Result<Hospitalization, ChartError> {
        self.lock_state(|state| state.hospitalizations.get(&id).cloned())?
            .ok_or_else(|| ChartError::not_found("hospitalization", id))
    }

    fn create_row(&self, row: &ChartRow) -> Result<(), ChartError> {
        self.lock_state(|state| state.rows.push(row.clone()))
    }

    fn delete_row(&self, id: Uuid) -> Result<(), ChartError> {
        self.lock_state(|state| {
            let before = state.rows.len();
            state.rows.retain(|r| r.id != id);
            if state.rows.len() == before {
                return Err(ChartError::not_found("chart_row", id));
            }
            // Cascade.
            state.entries.retain(|e| e.row_ref != id);
            state.schedules.retain(|s| s.row_ref != id);
            Ok(())
        })?
    }

    fn create_entry(&self, entry: &ChartEntry) -> Result<(), ChartError> {
        self.lock_state(|state| {
            // Uniqueness arbitration: a concurrent create for an occupied
            // (row, hour) key coalesces into the latest write.
            let key = (entry.row_ref, normalize_hour(entry.at_time));
            state
                .entries
                .retain(|e| (e.row_ref, normalize_hour(e.at_time)) != key);
            state.entries.push(entry.clone());
        })
    }

    fn update_entry(&self, entry: &ChartEntry) -> Result<(), ChartError> {
        self.lock_state(|state| {
            match state.entries.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => {
                    *existing = entry.clone();
                    Ok(())
                }
                None => Err(ChartError::not_found("chart_entry", entry.id)),
            }
        })?
    }

    fn delete_entry(&self, id: Uuid) -> Result<(), ChartError> {
        self.lock_state(|state| {
            let before = state.entries.len();
            state.entries.retain(|e| e.id != id);
            if state.entries.len() == before {
                return Err(ChartError::not_found("chart_entry", id));
            }
            Ok(())
        })?
    }

    fn create_schedule(&self, schedule: &Schedule) -> Result<(), ChartError> {
        self.lock_state(|state| state.schedules.push(schedule.clone()))
    }

    fn delete_schedule(&self, id: Uuid) -> Result<(), ChartError> {
        self.lock_state(|state| {
            let before = state.schedules.len();
            state.schedules.retain(|s| s.id != id);
            if state.schedules.len() == before {
                return Err(ChartError::not_found("schedule", id));
            }
            Ok(())
        })?
    }

    fn fetch_medication(&self, id: Uuid) -> Result<Option<Medication>, ChartError> {
        self.lock_state(|state| state.medications.get(&id).cloned())
    }

    fn fetch_material_usages(
        &self,
        hospitalization_id: Uuid,
    ) -> Result<Vec<MaterialUsage>, ChartError> {
        self.lock_state(|state| {
            state
                .usages
                .get(&hospitalization_id)
                .cloned()
                .unwrap_or_default()
        })
    }
}
