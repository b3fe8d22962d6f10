//! Observation scheduling and hour-grid engine for in-patient clinic
//! records.
//!
//! The grid tracks clinical parameters (vitals, checks, notes, medication
//! doses) per hospitalization on a wall-clock hour axis. Schedules decide
//! which cells expect a value at which hour; the dose module turns per-kg
//! catalog references into absolute amounts; the summary module reduces a
//! stay into per-medication and per-material totals. Persistence lives
//! behind the `ChartStore` seam — every mutation is one round trip to the
//! store followed by a full chart re-fetch.

pub mod config;
pub mod dosage;
pub mod error;
pub mod grid;
pub mod models;
pub mod scheduling;
pub mod service;
pub mod store;
pub mod summary;
pub mod timegrid;

pub use error::ChartError;
pub use grid::{display_value, ChartData, ChartGrid, ChartView, GridCell, GridRowView};
pub use service::ChartService;
pub use store::{ChartStore, HttpChartStore, MemoryChartStore};
