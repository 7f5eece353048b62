//! Startup wiring: topic selection and the optional metrics store.

use anyhow::Context;
use cryptosentry_core::{default_topics, load_topics, AppConfig, Topic};
use cryptosentry_pipeline::{open_metrics_store, InfluxClient};

/// Topics from `CRYPTOSENTRY_TOPICS_PATH`, or the built-in set.
///
/// # Errors
///
/// Returns an error if a configured topics file cannot be loaded.
pub(crate) fn resolve_topics(config: &AppConfig) -> anyhow::Result<Vec<Topic>> {
    match &config.topics_path {
        Some(path) => load_topics(path)
            .with_context(|| format!("failed to load topics from {}", path.display())),
        None => Ok(default_topics()),
    }
}

/// Connect to InfluxDB when configured. Any failure disables metrics.
pub(crate) async fn connect_metrics(config: &AppConfig) -> Option<InfluxClient> {
    let target = config.metrics.as_ref()?;
    let client = match InfluxClient::new(&target.url, config.http_timeout_secs) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(url = %target.url, error = %e, "metrics client unavailable; metrics disabled");
            return None;
        }
    };
    open_metrics_store(client, &target.database).await
}
