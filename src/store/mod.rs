//! The external persistent store, seen through a request/response seam.
//!
//! The engine never owns persistence: every mutation is one round trip, and
//! the full chart is re-fetched afterwards. The store is also the sole
//! arbiter of the one-entry-per-(row, hour) invariant — concurrent upserts
//! for the same key are its problem to reject or coalesce, and the engine
//! simply reflects whatever the next fetch returns.

pub mod http;
pub mod memory;

pub use http::HttpChartStore;
pub use memory::MemoryChartStore;

use uuid::Uuid;

use crate::error::ChartError;
use crate::grid::ChartData;
use crate::models::{ChartEntry, ChartRow, Hospitalization, MaterialUsage, Medication, Schedule};

/// Request/response interface of the chart store. Calls are bounded by the
/// configured timeout; a timeout surfaces as `ChartError::Timeout` and is
/// the only error class worth retrying.
pub trait ChartStore {
    /// Full chart (rows, entries, schedules) for one hospitalization.
    fn fetch_chart(&self, hospitalization_id: Uuid) -> Result<ChartData, ChartError>;

    fn fetch_hospitalization(&self, id: Uuid) -> Result<Hospitalization, ChartError>;

    fn create_row(&self, row: &ChartRow) -> Result<(), ChartError>;

    /// Deleting a row cascades to its entries and schedules.
    fn delete_row(&self, id: Uuid) -> Result<(), ChartError>;

    fn create_entry(&self, entry: &ChartEntry) -> Result<(), ChartError>;

    fn update_entry(&self, entry: &ChartEntry) -> Result<(), ChartError>;

    fn delete_entry(&self, id: Uuid) -> Result<(), ChartError>;

    fn create_schedule(&self, schedule: &Schedule) -> Result<(), ChartError>;

    fn delete_schedule(&self, id: Uuid) -> Result<(), ChartError>;

    fn fetch_medication(&self, id: Uuid) -> Result<Option<Medication>, ChartError>;

    fn fetch_material_usages(
        &self,
        hospitalization_id: Uuid,
    ) -> Result<Vec<MaterialUsage>, ChartError>;
}
