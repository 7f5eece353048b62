mod startup;

use anyhow::Context;
use clap::Parser;
use cryptosentry_pipeline::{
    GoogleNewsClient, LexiconScorer, MetricsStore, Pipeline, PipelineSettings, RedditClient,
};
use tracing_subscriber::EnvFilter;

/// Search crypto news, score sentiment and post new articles to Reddit.
#[derive(Debug, Parser)]
#[command(name = "cryptosentry", version)]
#[command(about = "Post sentiment-tagged crypto news to Reddit")]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _cli = Cli::parse();

    let config = cryptosentry_core::load_app_config().context("failed to load configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    let topics = startup::resolve_topics(&config)?;
    let forum = RedditClient::login(&config.reddit, config.http_timeout_secs)
        .await
        .context("Reddit login failed")?;
    let source = GoogleNewsClient::new(config.http_timeout_secs)?;
    let scorer = LexiconScorer;
    let metrics = startup::connect_metrics(&config).await;

    let pipeline = Pipeline::new(&source, &scorer, &forum, PipelineSettings::from_config(&config))
        .with_metrics(metrics.as_ref().map(|m| m as &dyn MetricsStore));

    let summary = pipeline.run(&topics).await.context("run aborted")?;
    tracing::info!(
        published = summary.published(),
        duplicates = summary.duplicates(),
        failed = summary.failed(),
        metrics_written = ?summary.metrics_written,
        "run complete"
    );

    Ok(())
}
