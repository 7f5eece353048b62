//! Run orchestration: topics → terms → articles → forum, then one metrics batch.

use cryptosentry_core::{AppConfig, FlairIds, SearchSettings, Topic};

use crate::classifier::classify_articles;
use crate::error::PipelineError;
use crate::forum::{is_article_posted, publish_article, ForumClient};
use crate::metrics::{MetricsRecorder, MetricsStore};
use crate::scorer::SentimentScorer;
use crate::sources::{fetch_articles, ArticleSource, SearchQuery};
use crate::types::{Article, ArticleOutcome, ArticleReport, FailedStage, RunSummary};

/// Forum target and search parameters for a run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub subreddit: String,
    pub flairs: FlairIds,
    pub search: SearchSettings,
}

impl PipelineSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            subreddit: config.subreddit.clone(),
            flairs: config.flairs.clone(),
            search: config.search.clone(),
        }
    }
}

/// The curation pipeline, wired to its collaborators once at startup.
pub struct Pipeline<'a> {
    source: &'a dyn ArticleSource,
    scorer: &'a dyn SentimentScorer,
    forum: &'a dyn ForumClient,
    metrics: Option<&'a dyn MetricsStore>,
    settings: PipelineSettings,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(
        source: &'a dyn ArticleSource,
        scorer: &'a dyn SentimentScorer,
        forum: &'a dyn ForumClient,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            scorer,
            forum,
            metrics: None,
            settings,
        }
    }

    /// Enable end-of-run metrics. `None` leaves metrics disabled.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Option<&'a dyn MetricsStore>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Run one pass over `topics`.
    ///
    /// Per-article failures are recorded in the summary and the run moves on.
    ///
    /// # Errors
    ///
    /// Search failures and the final metrics batch write are fatal and
    /// returned as-is. Posts made before the failure stay live.
    pub async fn run(&self, topics: &[Topic]) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();
        let mut recorder = self.metrics.map(|_| MetricsRecorder::new());

        for topic in topics {
            for term in &topic.terms {
                let query = SearchQuery {
                    term,
                    period: &self.settings.search.period,
                    language: &self.settings.search.language,
                };
                let fetched = fetch_articles(self.source, &query, self.settings.search.pages).await?;
                let fetched_count = fetched.len();
                let classified = classify_articles(self.scorer, fetched);

                tracing::info!(
                    symbol = %topic.symbol,
                    term = %term,
                    fetched = fetched_count,
                    kept = classified.len(),
                    "classified articles"
                );

                for classified in classified {
                    let article = classified.for_topic(&topic.symbol);
                    let outcome = self.process_article(&article, recorder.as_mut()).await;
                    summary.articles.push(ArticleReport {
                        symbol: article.symbol,
                        title: article.raw.title,
                        outcome,
                    });
                }
            }
        }

        if let (Some(store), Some(recorder)) = (self.metrics, recorder) {
            summary.metrics_written = Some(recorder.flush(store).await?);
        }

        Ok(summary)
    }

    async fn process_article(
        &self,
        article: &Article,
        recorder: Option<&mut MetricsRecorder>,
    ) -> ArticleOutcome {
        match self.publish_if_new(article, recorder).await {
            Ok(outcome) => outcome,
            Err((stage, e)) => {
                tracing::warn!(
                    symbol = %article.symbol,
                    title = %article.title(),
                    stage = ?stage,
                    error = %e,
                    "skipping article"
                );
                ArticleOutcome::Failed {
                    stage,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn publish_if_new(
        &self,
        article: &Article,
        recorder: Option<&mut MetricsRecorder>,
    ) -> Result<ArticleOutcome, (FailedStage, PipelineError)> {
        let subreddit = &self.settings.subreddit;

        let posted = is_article_posted(self.forum, subreddit, article.title())
            .await
            .map_err(|e| (FailedStage::DuplicateCheck, e))?;
        if posted {
            tracing::info!(symbol = %article.symbol, "Skipping: {}", article.title());
            return Ok(ArticleOutcome::Duplicate);
        }

        publish_article(self.forum, subreddit, article, &self.settings.flairs)
            .await
            .map_err(|e| (FailedStage::Publish, e))?;

        if let Some(recorder) = recorder {
            recorder
                .record(article)
                .map_err(|e| (FailedStage::MetricPrep, e))?;
        }

        Ok(ArticleOutcome::Published)
    }
}
