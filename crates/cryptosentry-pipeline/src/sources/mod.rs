//! News search sources.

mod google_news;
mod rss_helpers;

pub use google_news::{GoogleNewsClient, PAGE_SIZE};

use std::ops::Range;

use async_trait::async_trait;

use crate::error::PipelineError;
use crate::types::RawArticle;

/// Parameters for one term search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery<'a> {
    pub term: &'a str,
    /// Lookback window such as `24h`.
    pub period: &'a str,
    pub language: &'a str,
}

/// A paginated news search provider.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch one page of results. Pages are numbered from 1; a page past the
    /// end of the results is empty.
    async fn search_page(
        &self,
        query: &SearchQuery<'_>,
        page: u32,
    ) -> Result<Vec<RawArticle>, PipelineError>;
}

/// Page numbers fetched for a configured page count.
///
/// The upper bound is exclusive: `pages = 5` fetches pages 1 through 4.
#[must_use]
pub fn page_numbers(pages: u32) -> Range<u32> {
    1..pages
}

/// Fetch every page for a term, in page order.
///
/// # Errors
///
/// Returns the first error raised by the source; no page is retried.
pub async fn fetch_articles<S>(
    source: &S,
    query: &SearchQuery<'_>,
    pages: u32,
) -> Result<Vec<RawArticle>, PipelineError>
where
    S: ArticleSource + ?Sized,
{
    let mut articles = Vec::new();
    for page in page_numbers(pages) {
        let page_articles = source.search_page(query, page).await?;
        tracing::debug!(
            term = query.term,
            page,
            count = page_articles.len(),
            "fetched search page"
        );
        articles.extend(page_articles);
    }
    Ok(articles)
}
