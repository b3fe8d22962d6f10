//! HTTP client for the chart store.
//!
//! Thin JSON-over-HTTP mapping of the `ChartStore` trait. Every request
//! shares one blocking client with the configured timeout; `is_timeout`
//! maps to the retryable `Timeout` error, `is_connect` to
//! `StoreUnavailable`, and HTTP 404 to `NotFound`.

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::config::STORE_TIMEOUT_SECS;
use crate::error::ChartError;
use crate::grid::ChartData;
use crate::models::{ChartEntry, ChartRow, Hospitalization, MaterialUsage, Medication, Schedule};
use crate::store::ChartStore;

pub struct HttpChartStore {
    base_url: String,
    client: Client,
    timeout_secs: u64,
}

impl HttpChartStore {
    /// Create a store client against `base_url` with the given per-request
    /// timeout.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ChartError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ChartError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    /// Store client with the default 15-second bound.
    pub fn with_default_timeout(base_url: &str) -> Result<Self, ChartError> {
        Self::new(base_url, STORE_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send_error(&self, e: reqwest::Error) -> ChartError {
        if e.is_timeout() {
            ChartError::Timeout {
                secs: self.timeout_secs,
            }
        } else if e.is_connect() {
            ChartError::StoreUnavailable {
                url: self.base_url.clone(),
            }
        } else {
            ChartError::Transport(e.to_string())
        }
    }

    /// Map a non-success status; `entity`/`id` name the target for 404s.
    fn check_status(
        response: Response,
        entity: &str,
        id: impl ToString,
    ) -> Result<Response, ChartError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ChartError::not_found(entity, id));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ChartError::Store {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        entity: &str,
        id: impl ToString,
    ) -> Result<T, ChartError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .map_err(|e| self.send_error(e))?;
        Self::check_status(response, entity, id)?
            .json()
            .map_err(|e| ChartError::ResponseParsing(e.to_string()))
    }

    fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        entity: &str,
        id: impl ToString,
    ) -> Result<(), ChartError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .map_err(|e| self.send_error(e))?;
        Self::check_status(response, entity, id).map(|_| ())
    }

    fn put_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        entity: &str,
        id: impl ToString,
    ) -> Result<(), ChartError> {
        let response = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .map_err(|e| self.send_error(e))?;
        Self::check_status(response, entity, id).map(|_| ())
    }

    fn delete(&self, path: &str, entity: &str, id: impl ToString) -> Result<(), ChartError> {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .map_err(|e| self.send_error(e))?;
        Self::check_status(response, entity, id).map(|_| ())
    }
}

impl ChartStore for HttpChartStore {
    fn fetch_chart(&self, hospitalization_id: Uuid) -> Result<ChartData, ChartError> {
        self.get_json(
            &format!("/hospitalizations/{hospitalization_id}/chart"),
            "hospitalization",
            hospitalization_id,
        )
    }

    fn fetch_hospitalization(&self, id: Uuid) -> Result<Hospitalization, ChartError> {
        self.get_json(&format!("/hospitalizations/{id}"), "hospitalization", id)
    }

    fn create_row(&self, row: &ChartRow) -> Result<(), ChartError> {
        self.post_json("/chart-rows", row, "chart_row", row.id)
    }

    fn delete_row(&self, id: Uuid) -> Result<(), ChartError> {
        self.delete(&format!("/chart-rows/{id}"), "chart_row", id)
    }

    fn create_entry(&self, entry: &ChartEntry) -> Result<(), ChartError> {
        self.post_json("/chart-entries", entry, "chart_entry", entry.id)
    }

    fn update_entry(&self, entry: &ChartEntry) -> Result<(), ChartError> {
        self.put_json(
            &format!("/chart-entries/{}", entry.id),
            entry,
            "chart_entry",
            entry.id,
        )
    }

    fn delete_entry(&self, id: Uuid) -> Result<(), ChartError> {
        self.delete(&format!("/chart-entries/{id}"), "chart_entry", id)
    }

    fn create_schedule(&self, schedule: &Schedule) -> Result<(), ChartError> {
        self.post_json("/schedules", schedule, "schedule", schedule.id)
    }

    fn delete_schedule(&self, id: Uuid) -> Result<(), ChartError> {
        self.delete(&format!("/schedules/{id}"), "schedule", id)
    }

    fn fetch_medication(&self, id: Uuid) -> Result<Option<Medication>, ChartError> {
        match self.get_json(&format!("/medications/{id}"), "medication", id) {
            Ok(med) => Ok(Some(med)),
            // A medication the catalog no longer carries is not an error;
            // the cell just loses its dose reference.
            Err(ChartError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn fetch_material_usages(
        &self,
        hospitalization_id: Uuid,
    ) -> Result<Vec<MaterialUsage>, ChartError> {
        self.get_json(
            &format!("/hospitalizations/{hospitalization_id}/material-usages"),
            "hospitalization",
            hospitalization_id,
        )
    }
}
