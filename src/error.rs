use chrono::NaiveDateTime;
use thiserror::Error;

/// Engine-level errors. Every variant is scoped to the single operation
/// that raised it; none is fatal to the process.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Invalid value: {reason}")]
    Validation { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Hour {hour} is before admission")]
    OutOfRange { hour: NaiveDateTime },

    #[error("Store request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Cannot reach chart store at {url}")]
    StoreUnavailable { url: String },

    #[error("Store returned HTTP {status}: {body}")]
    Store { status: u16, body: String },

    #[error("Store transport error: {0}")]
    Transport(String),

    #[error("Failed to parse store response: {0}")]
    ResponseParsing(String),
}

impl ChartError {
    pub fn validation(reason: impl Into<String>) -> Self {
        ChartError::Validation {
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        ChartError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Only timeouts are worth retrying; everything else is either a caller
    /// mistake or a store-side failure that a retry would just repeat.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ChartError::Timeout { .. })
    }
}
