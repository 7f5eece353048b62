//! News sentiment curation pipeline for CryptoSentry.
//!
//! Searches Google News for each topic's terms, scores titles and descriptions
//! with a market lexicon, drops neutral articles, and posts the rest to a
//! subreddit with a positive or negative flair. Posted articles can be
//! recorded to InfluxDB as one batch per run.

pub mod classifier;
pub mod error;
pub mod forum;
pub mod metrics;
pub mod pipeline;
pub mod scorer;
pub mod sources;
pub mod types;

pub use classifier::{classify, classify_articles, combine_scores};
pub use error::PipelineError;
pub use forum::{ForumClient, RedditClient};
pub use metrics::{open_metrics_store, InfluxClient, MetricPoint, MetricsRecorder, MetricsStore};
pub use pipeline::{Pipeline, PipelineSettings};
pub use scorer::{LexiconScorer, SentimentScorer};
pub use sources::{ArticleSource, GoogleNewsClient, SearchQuery};
pub use types::{
    Article, ArticleOutcome, ArticleReport, Classification, ClassifiedArticle, FailedStage,
    RawArticle, RunSummary, SentimentScore,
};
