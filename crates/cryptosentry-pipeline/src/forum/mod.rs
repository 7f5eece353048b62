//! Discussion forum access: duplicate detection and link publishing.

mod reddit;

pub use reddit::RedditClient;

use async_trait::async_trait;
use cryptosentry_core::FlairIds;

use crate::error::PipelineError;
use crate::types::{Article, Classification};

/// Operations the pipeline needs from the target forum.
#[async_trait]
pub trait ForumClient: Send + Sync {
    /// Whether a search of `forum` for `query` returns at least one post.
    async fn has_matching_post(&self, forum: &str, query: &str) -> Result<bool, PipelineError>;

    /// Submit a link post with the given flair template id.
    async fn submit_link(
        &self,
        forum: &str,
        title: &str,
        url: &str,
        flair_id: &str,
    ) -> Result<(), PipelineError>;
}

/// Check whether an article with this title was already posted.
///
/// # Errors
///
/// Propagates the forum search error.
pub async fn is_article_posted<F>(client: &F, forum: &str, title: &str) -> Result<bool, PipelineError>
where
    F: ForumClient + ?Sized,
{
    client.has_matching_post(forum, title).await
}

/// Post title shown on the forum: `[SYMBOL] original title`.
#[must_use]
pub fn compose_title(symbol: &str, title: &str) -> String {
    format!("[{symbol}] {title}")
}

#[must_use]
pub fn flair_id(flairs: &FlairIds, classification: Classification) -> &str {
    match classification {
        Classification::Positive => &flairs.positive,
        Classification::Negative => &flairs.negative,
    }
}

/// Publish an article as a flaired link post.
///
/// # Errors
///
/// Propagates the forum submit error.
pub async fn publish_article<F>(
    client: &F,
    forum: &str,
    article: &Article,
    flairs: &FlairIds,
) -> Result<(), PipelineError>
where
    F: ForumClient + ?Sized,
{
    let title = compose_title(&article.symbol, article.title());
    client
        .submit_link(
            forum,
            &title,
            &article.raw.link,
            flair_id(flairs, article.classification),
        )
        .await?;

    tracing::info!(
        symbol = %article.symbol,
        classification = %article.classification,
        title = %title,
        "published article"
    );
    Ok(())
}
