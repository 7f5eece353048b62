//! Google News RSS search source.

use std::cmp::Reverse;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use super::rss_helpers::parse_news_feed;
use super::{ArticleSource, SearchQuery};
use crate::error::PipelineError;
use crate::types::RawArticle;

const DEFAULT_BASE_URL: &str = "https://news.google.com";

/// Results per page. The RSS endpoint returns one list, which is windowed
/// into pages of this size. Page 1 downloads the feed; later pages of the
/// same search are cut from that snapshot so the windows never overlap.
pub const PAGE_SIZE: usize = 10;

/// Google News RSS client.
///
/// Use [`GoogleNewsClient::new`] for production or
/// [`GoogleNewsClient::with_base_url`] to point at a mock server in tests.
pub struct GoogleNewsClient {
    client: reqwest::Client,
    base_url: String,
    snapshot: Mutex<Option<FeedSnapshot>>,
}

/// Sorted feed of the most recent search.
struct FeedSnapshot {
    url: String,
    articles: Vec<RawArticle>,
}

impl GoogleNewsClient {
    /// # Errors
    ///
    /// Returns [`PipelineError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self, PipelineError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("cryptosentry/0.1 (news-sentiment)")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            snapshot: Mutex::new(None),
        })
    }

    fn search_url(&self, query: &SearchQuery<'_>) -> String {
        let q = format!("{} when:{}", query.term, query.period);
        let encoded = utf8_percent_encode(&q, NON_ALPHANUMERIC).to_string();
        let lang = utf8_percent_encode(query.language, NON_ALPHANUMERIC).to_string();
        format!(
            "{}/rss/search?q={encoded}&hl={lang}&gl=US&ceid=US:{lang}",
            self.base_url
        )
    }
}

#[async_trait]
impl ArticleSource for GoogleNewsClient {
    async fn search_page(
        &self,
        query: &SearchQuery<'_>,
        page: u32,
    ) -> Result<Vec<RawArticle>, PipelineError> {
        if page == 0 {
            return Ok(Vec::new());
        }

        let url = self.search_url(query);
        if page > 1 {
            if let Some(window) = self.cached_page(&url, page) {
                return Ok(window);
            }
        }

        let articles = self.fetch_feed(&url).await?;
        let window = page_window(&articles, page);
        tracing::debug!(url = %url, items = articles.len(), "fetched news feed");
        *self.lock_snapshot() = Some(FeedSnapshot { url, articles });

        Ok(window)
    }
}

impl GoogleNewsClient {
    async fn fetch_feed(&self, url: &str) -> Result<Vec<RawArticle>, PipelineError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let mut articles = parse_news_feed(&body)?;
        // Newest first; undated items last.
        articles.sort_by_key(|a| (a.published_at.is_none(), Reverse(a.published_at)));
        Ok(articles)
    }

    fn cached_page(&self, url: &str, page: u32) -> Option<Vec<RawArticle>> {
        self.lock_snapshot()
            .as_ref()
            .filter(|snapshot| snapshot.url == url)
            .map(|snapshot| page_window(&snapshot.articles, page))
    }

    fn lock_snapshot(&self) -> MutexGuard<'_, Option<FeedSnapshot>> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Select the 1-based `page` of [`PAGE_SIZE`] items.
fn page_window(articles: &[RawArticle], page: u32) -> Vec<RawArticle> {
    let Some(index) = page.checked_sub(1) else {
        return Vec::new();
    };
    let skip = usize::try_from(index).unwrap_or(usize::MAX).saturating_mul(PAGE_SIZE);
    articles.iter().skip(skip).take(PAGE_SIZE).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<RawArticle> {
        (0..n)
            .map(|i| RawArticle {
                title: format!("article {i}"),
                description: String::new(),
                media: String::new(),
                link: format!("https://example.com/{i}"),
                image: None,
                published_at: None,
            })
            .collect()
    }

    #[test]
    fn page_window_slices_fixed_size_pages() {
        let page = page_window(&numbered(25), 2);
        assert_eq!(page.len(), PAGE_SIZE);
        assert_eq!(page[0].title, "article 10");
    }

    #[test]
    fn last_page_is_partial_and_past_end_is_empty() {
        assert_eq!(page_window(&numbered(25), 3).len(), 5);
        assert!(page_window(&numbered(25), 4).is_empty());
    }

    #[test]
    fn page_zero_is_empty() {
        assert!(page_window(&numbered(5), 0).is_empty());
    }

    #[test]
    fn search_url_encodes_term_and_period() {
        let client = GoogleNewsClient::with_base_url(5, "http://localhost:1234/").unwrap();
        let url = client.search_url(&SearchQuery {
            term: "Stellar Lumens",
            period: "24h",
            language: "en",
        });
        assert_eq!(
            url,
            "http://localhost:1234/rss/search?q=Stellar%20Lumens%20when%3A24h&hl=en&gl=US&ceid=US:en"
        );
    }
}
