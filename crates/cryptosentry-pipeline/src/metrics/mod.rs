//! Per-run article metrics: point preparation, buffering and the batch write.

mod influx;
mod line_protocol;

pub use influx::InfluxClient;
pub use line_protocol::to_line_protocol;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;

use crate::error::PipelineError;
use crate::types::Article;

pub const MEASUREMENT: &str = "articles";

/// Time-series store that accepts one batch of points per run.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Select the database subsequent writes go to.
    async fn select_store(&mut self, name: &str) -> Result<(), PipelineError>;

    async fn write_batch(&self, points: &[MetricPoint]) -> Result<(), PipelineError>;
}

/// Select `database` on `store`, or disable metrics if that fails.
pub async fn open_metrics_store<S: MetricsStore>(mut store: S, database: &str) -> Option<S> {
    match store.select_store(database).await {
        Ok(()) => {
            tracing::info!(database, "metrics enabled");
            Some(store)
        }
        Err(e) => {
            tracing::warn!(database, error = %e, "metrics store unavailable; metrics disabled");
            None
        }
    }
}

/// One article measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    pub measurement: &'static str,
    /// Descriptive attributes, in a fixed order.
    pub tags: Vec<(&'static str, String)>,
    /// Article publish time truncated to whole seconds.
    pub timestamp: DateTime<Utc>,
    pub fields: Vec<(&'static str, f64)>,
}

impl MetricPoint {
    /// Build the point for a published article.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MetricPrep`] if the article has no publish time.
    pub fn from_article(article: &Article) -> Result<Self, PipelineError> {
        let published_at = article.raw.published_at.ok_or_else(|| {
            PipelineError::MetricPrep(format!("article '{}' has no publish time", article.title()))
        })?;

        let raw = &article.raw;
        Ok(Self {
            measurement: MEASUREMENT,
            tags: vec![
                ("title", raw.title.clone()),
                ("media", raw.media.clone()),
                ("description", raw.description.clone()),
                ("link", raw.link.clone()),
                ("img", raw.image.clone().unwrap_or_default()),
                ("symbol", article.symbol.clone()),
            ],
            timestamp: published_at.trunc_subsecs(0),
            fields: vec![
                ("positive", article.sentiment.pos),
                ("negative", article.sentiment.neg),
                ("neutral", article.sentiment.neu),
            ],
        })
    }

    /// Second-precision UTC time, e.g. `2024-10-14T12:30:45Z`.
    #[must_use]
    pub fn time(&self) -> String {
        self.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<f64> {
        self.fields.iter().find(|(k, _)| *k == key).map(|&(_, v)| v)
    }
}

/// Buffers points for the whole run; written once by [`MetricsRecorder::flush`].
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    points: Vec<MetricPoint>,
}

impl MetricsRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare and buffer the point for `article`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MetricPrep`] if the point cannot be built; nothing is buffered.
    pub fn record(&mut self, article: &Article) -> Result<(), PipelineError> {
        let point = MetricPoint::from_article(article)?;
        self.points.push(point);
        Ok(())
    }

    #[must_use]
    pub fn points(&self) -> &[MetricPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Write every buffered point in a single batch.
    ///
    /// # Errors
    ///
    /// Propagates the store's write error; the buffered points are dropped.
    pub async fn flush<S>(self, store: &S) -> Result<usize, PipelineError>
    where
        S: MetricsStore + ?Sized,
    {
        let count = self.points.len();
        store.write_batch(&self.points).await?;
        tracing::info!(points = count, "wrote metrics batch");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::{Classification, RawArticle, SentimentScore};

    fn article(published_at: Option<DateTime<Utc>>) -> Article {
        Article {
            symbol: "BTC".to_string(),
            raw: RawArticle {
                title: "Bitcoin surges".to_string(),
                description: "Price jumps".to_string(),
                media: "CoinDesk".to_string(),
                link: "https://example.com/btc".to_string(),
                image: None,
                published_at,
            },
            sentiment: SentimentScore::new(0.0, 0.5, 0.5),
            classification: Classification::Positive,
        }
    }

    #[test]
    fn point_carries_article_fields() {
        let at = Utc
            .with_ymd_and_hms(2024, 10, 14, 12, 30, 45)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(750))
            .unwrap();
        let point = MetricPoint::from_article(&article(Some(at))).unwrap();

        assert_eq!(point.measurement, "articles");
        assert_eq!(point.time(), "2024-10-14T12:30:45Z");
        assert_eq!(point.tag("title"), Some("Bitcoin surges"));
        assert_eq!(point.tag("media"), Some("CoinDesk"));
        assert_eq!(point.tag("description"), Some("Price jumps"));
        assert_eq!(point.tag("link"), Some("https://example.com/btc"));
        assert_eq!(point.tag("img"), Some(""));
        assert_eq!(point.tag("symbol"), Some("BTC"));
        assert_eq!(point.field("positive"), Some(0.5));
        assert_eq!(point.field("negative"), Some(0.0));
        assert_eq!(point.field("neutral"), Some(0.5));
    }

    #[test]
    fn missing_publish_time_is_a_prep_error() {
        let err = MetricPoint::from_article(&article(None)).unwrap_err();
        assert!(matches!(err, PipelineError::MetricPrep(_)));
    }

    #[test]
    fn recorder_skips_failed_points() {
        let mut recorder = MetricsRecorder::new();
        assert!(recorder.record(&article(None)).is_err());
        assert!(recorder.is_empty());

        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        recorder.record(&article(Some(at))).unwrap();
        assert_eq!(recorder.len(), 1);
    }
}
