pub mod catalog;
pub mod entry;
pub mod hospitalization;
pub mod row;
pub mod schedule;

pub use catalog::{MaterialUsage, Medication};
pub use entry::{ChartEntry, EntryInput, EntryValue};
pub use hospitalization::Hospitalization;
pub use row::{ChartRow, RowChoice, RowInput, RowKind};
pub use schedule::{Schedule, ScheduleInput};
