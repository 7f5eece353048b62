//! InfluxDB 1.x HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::line_protocol::to_line_protocol;
use super::{MetricPoint, MetricsStore};
use crate::error::PipelineError;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    series: Vec<Series>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Series {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// InfluxDB client. Writes are rejected until a database is selected.
pub struct InfluxClient {
    client: reqwest::Client,
    base_url: String,
    database: Option<String>,
}

impl InfluxClient {
    /// # Errors
    ///
    /// Returns [`PipelineError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            database: None,
        })
    }

    #[must_use]
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    async fn list_databases(&self) -> Result<Vec<String>, PipelineError> {
        let response = self
            .client
            .get(format!("{}/query", self.base_url))
            .query(&[("q", "SHOW DATABASES")])
            .send()
            .await
            .map_err(|e| PipelineError::Influx(format!("query request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(PipelineError::Influx(format!(
                "SHOW DATABASES returned status {}",
                response.status()
            )));
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Influx(format!("query response parse error: {e}")))?;

        let mut names = Vec::new();
        for result in body.results {
            if let Some(error) = result.error {
                return Err(PipelineError::Influx(format!("SHOW DATABASES failed: {error}")));
            }
            for series in result.series {
                names.extend(
                    series
                        .values
                        .iter()
                        .filter_map(|row| row.first())
                        .filter_map(|v| v.as_str())
                        .map(ToString::to_string),
                );
            }
        }
        Ok(names)
    }
}

#[async_trait]
impl MetricsStore for InfluxClient {
    async fn select_store(&mut self, name: &str) -> Result<(), PipelineError> {
        let databases = self.list_databases().await?;
        if !databases.iter().any(|db| db == name) {
            return Err(PipelineError::Influx(format!("database '{name}' not found")));
        }
        self.database = Some(name.to_string());
        Ok(())
    }

    async fn write_batch(&self, points: &[MetricPoint]) -> Result<(), PipelineError> {
        let Some(database) = self.database.as_deref() else {
            return Err(PipelineError::Influx("no database selected".to_string()));
        };
        if points.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(format!("{}/write", self.base_url))
            .query(&[("db", database), ("precision", "s")])
            .body(to_line_protocol(points))
            .send()
            .await
            .map_err(|e| PipelineError::Influx(format!("write request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Influx(format!(
                "write returned status {status}: {body}"
            )));
        }

        Ok(())
    }
}
