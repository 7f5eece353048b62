use chrono::{DateTime, Utc};
use serde::Serialize;

/// One search result as returned by a news source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawArticle {
    pub title: String,
    pub description: String,
    /// Publisher name, e.g. `CoinDesk`.
    pub media: String,
    pub link: String,
    pub image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Sentiment proportions, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SentimentScore {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
}

impl SentimentScore {
    #[must_use]
    pub fn new(neg: f64, neu: f64, pos: f64) -> Self {
        Self { neg, neu, pos }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Positive,
    Negative,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Positive => write!(f, "positive"),
            Classification::Negative => write!(f, "negative"),
        }
    }
}

/// An article that passed the sentiment filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedArticle {
    pub raw: RawArticle,
    /// Title and description scores combined.
    pub sentiment: SentimentScore,
    pub classification: Classification,
}

impl ClassifiedArticle {
    /// Attach the owning topic symbol.
    #[must_use]
    pub fn for_topic(self, symbol: &str) -> Article {
        Article {
            symbol: symbol.to_string(),
            raw: self.raw,
            sentiment: self.sentiment,
            classification: self.classification,
        }
    }
}

/// A classified article bound to the topic it was found for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub symbol: String,
    pub raw: RawArticle,
    pub sentiment: SentimentScore,
    pub classification: Classification,
}

impl Article {
    #[must_use]
    pub fn title(&self) -> &str {
        &self.raw.title
    }
}

/// Step at which a per-article failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    DuplicateCheck,
    Publish,
    /// The post is live but no metric point was buffered for it.
    MetricPrep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ArticleOutcome {
    Published,
    Duplicate,
    Failed { stage: FailedStage, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleReport {
    pub symbol: String,
    pub title: String,
    pub outcome: ArticleOutcome,
}

/// Result of one pass over all topics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub articles: Vec<ArticleReport>,
    /// Number of points written in the end-of-run batch. `None` when metrics are disabled.
    pub metrics_written: Option<usize>,
}

impl RunSummary {
    #[must_use]
    pub fn published(&self) -> usize {
        self.count(|o| matches!(o, ArticleOutcome::Published))
    }

    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.count(|o| matches!(o, ArticleOutcome::Duplicate))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ArticleOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&ArticleOutcome) -> bool) -> usize {
        self.articles.iter().filter(|r| pred(&r.outcome)).count()
    }
}
