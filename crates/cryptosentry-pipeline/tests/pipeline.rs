//! Orchestrator tests with in-memory collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use cryptosentry_core::{FlairIds, SearchSettings, Topic};
use cryptosentry_pipeline::{
    ArticleOutcome, ArticleSource, FailedStage, ForumClient, MetricPoint, MetricsStore, Pipeline,
    PipelineError, PipelineSettings, RawArticle, SearchQuery, SentimentScore, SentimentScorer,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Serves page 1 of each term from a map; every other page is empty.
#[derive(Default)]
struct FakeSource {
    pages: HashMap<String, Vec<RawArticle>>,
    failing_terms: HashSet<String>,
    requests: Mutex<Vec<(String, u32)>>,
}

#[async_trait]
impl ArticleSource for FakeSource {
    async fn search_page(
        &self,
        query: &SearchQuery<'_>,
        page: u32,
    ) -> Result<Vec<RawArticle>, PipelineError> {
        self.requests
            .lock()
            .unwrap()
            .push((query.term.to_string(), page));
        if self.failing_terms.contains(query.term) {
            return Err(PipelineError::Reddit("search backend down".to_string()));
        }
        if page != 1 {
            return Ok(Vec::new());
        }
        Ok(self.pages.get(query.term).cloned().unwrap_or_default())
    }
}

/// Returns fixed scores keyed by exact text; unknown text is neutral.
struct TableScorer(HashMap<String, SentimentScore>);

impl SentimentScorer for TableScorer {
    fn score(&self, text: &str) -> SentimentScore {
        self.0
            .get(text)
            .copied()
            .unwrap_or(SentimentScore::new(0.0, 1.0, 0.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Submission {
    forum: String,
    title: String,
    url: String,
    flair_id: String,
}

#[derive(Default)]
struct FakeForum {
    existing_titles: HashSet<String>,
    failing_searches: HashSet<String>,
    failing_submits: HashSet<String>,
    searches: Mutex<Vec<String>>,
    submissions: Mutex<Vec<Submission>>,
}

impl FakeForum {
    fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForumClient for FakeForum {
    async fn has_matching_post(&self, _forum: &str, query: &str) -> Result<bool, PipelineError> {
        self.searches.lock().unwrap().push(query.to_string());
        if self.failing_searches.contains(query) {
            return Err(PipelineError::Reddit("search failed".to_string()));
        }
        Ok(self.existing_titles.contains(query))
    }

    async fn submit_link(
        &self,
        forum: &str,
        title: &str,
        url: &str,
        flair_id: &str,
    ) -> Result<(), PipelineError> {
        if self.failing_submits.contains(title) {
            return Err(PipelineError::Reddit("submit rejected".to_string()));
        }
        self.submissions.lock().unwrap().push(Submission {
            forum: forum.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            flair_id: flair_id.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
struct FakeStore {
    fail_writes: bool,
    batches: Mutex<Vec<Vec<MetricPoint>>>,
}

#[async_trait]
impl MetricsStore for FakeStore {
    async fn select_store(&mut self, _name: &str) -> Result<(), PipelineError> {
        Ok(())
    }

    async fn write_batch(&self, points: &[MetricPoint]) -> Result<(), PipelineError> {
        if self.fail_writes {
            return Err(PipelineError::Influx("connection refused".to_string()));
        }
        self.batches.lock().unwrap().push(points.to_vec());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn settings() -> PipelineSettings {
    PipelineSettings {
        subreddit: "CryptoSentry".to_string(),
        flairs: FlairIds {
            positive: "pos-flair".to_string(),
            negative: "neg-flair".to_string(),
        },
        search: SearchSettings {
            period: "24h".to_string(),
            pages: 5,
            language: "en".to_string(),
        },
    }
}

fn raw(title: &str, description: &str) -> RawArticle {
    RawArticle {
        title: title.to_string(),
        description: description.to_string(),
        media: "CoinDesk".to_string(),
        link: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
        image: Some("https://img.example.com/a.png".to_string()),
        published_at: Some(Utc.with_ymd_and_hms(2024, 10, 14, 12, 30, 45).unwrap()),
    }
}

fn score(pos: f64, neg: f64) -> SentimentScore {
    SentimentScore::new(neg, 1.0 - pos - neg, pos)
}

fn scorer(entries: &[(&str, SentimentScore)]) -> TableScorer {
    TableScorer(
        entries
            .iter()
            .map(|(text, s)| ((*text).to_string(), *s))
            .collect(),
    )
}

fn source(entries: Vec<(&str, Vec<RawArticle>)>) -> FakeSource {
    FakeSource {
        pages: entries
            .into_iter()
            .map(|(term, articles)| (term.to_string(), articles))
            .collect(),
        ..FakeSource::default()
    }
}

/// The `Bitcoin surges` article: title pos 0.6, description pos 0.4, no negativity.
fn bitcoin_surges() -> (FakeSource, TableScorer) {
    (
        source(vec![("Bitcoin", vec![raw("Bitcoin surges", "Price rallies")])]),
        scorer(&[
            ("Bitcoin surges", score(0.6, 0.0)),
            ("Price rallies", score(0.4, 0.0)),
        ]),
    )
}

fn btc_topics() -> Vec<Topic> {
    vec![Topic::new("BTC", &["Bitcoin"])]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_positive_article_is_published_and_metered() {
    let (source, scorer) = bitcoin_surges();
    let forum = FakeForum::default();
    let store = FakeStore::default();

    let pipeline =
        Pipeline::new(&source, &scorer, &forum, settings()).with_metrics(Some(&store));
    let summary = pipeline.run(&btc_topics()).await.expect("run succeeds");

    assert_eq!(
        forum.submissions(),
        vec![Submission {
            forum: "CryptoSentry".to_string(),
            title: "[BTC] Bitcoin surges".to_string(),
            url: "https://example.com/bitcoin-surges".to_string(),
            flair_id: "pos-flair".to_string(),
        }]
    );
    assert_eq!(summary.published(), 1);
    assert_eq!(summary.metrics_written, Some(1));

    let batches = store.batches.lock().unwrap();
    assert_eq!(batches.len(), 1, "metrics are written in one batch");
    let point = &batches[0][0];
    assert!((point.field("positive").unwrap() - 0.5).abs() < 1e-9);
    assert_eq!(point.field("negative"), Some(0.0));
    assert_eq!(point.tag("symbol"), Some("BTC"));
    assert_eq!(point.tag("title"), Some("Bitcoin surges"));
    assert_eq!(point.time(), "2024-10-14T12:30:45Z");
}

#[tokio::test]
async fn duplicate_check_uses_original_title() {
    let (source, scorer) = bitcoin_surges();
    let forum = FakeForum::default();

    Pipeline::new(&source, &scorer, &forum, settings())
        .run(&btc_topics())
        .await
        .unwrap();

    assert_eq!(*forum.searches.lock().unwrap(), ["Bitcoin surges"]);
}

#[tokio::test]
async fn already_posted_article_is_skipped() {
    let (source, scorer) = bitcoin_surges();
    let forum = FakeForum {
        existing_titles: HashSet::from(["Bitcoin surges".to_string()]),
        ..FakeForum::default()
    };
    let store = FakeStore::default();

    let summary = Pipeline::new(&source, &scorer, &forum, settings())
        .with_metrics(Some(&store))
        .run(&btc_topics())
        .await
        .expect("duplicates do not fail the run");

    assert!(forum.submissions().is_empty());
    assert_eq!(summary.duplicates(), 1);
    assert_eq!(summary.articles[0].outcome, ArticleOutcome::Duplicate);
    assert_eq!(summary.metrics_written, Some(0));
    assert!(store.batches.lock().unwrap()[0].is_empty());
}

#[tokio::test]
async fn neutral_articles_never_reach_the_forum() {
    let source = source(vec![("Bitcoin", vec![raw("Markets open", "Nothing much")])]);
    let scorer = scorer(&[]);
    let forum = FakeForum::default();

    let summary = Pipeline::new(&source, &scorer, &forum, settings())
        .run(&btc_topics())
        .await
        .unwrap();

    assert!(summary.articles.is_empty());
    assert!(forum.searches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn negative_article_gets_negative_flair() {
    let source = source(vec![("Bitcoin", vec![raw("Exchange hacked", "Funds stolen")])]);
    let scorer = scorer(&[
        ("Exchange hacked", score(0.0, 0.8)),
        ("Funds stolen", score(0.0, 0.4)),
    ]);
    let forum = FakeForum::default();

    Pipeline::new(&source, &scorer, &forum, settings())
        .run(&btc_topics())
        .await
        .unwrap();

    let submissions = forum.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].flair_id, "neg-flair");
}

#[tokio::test]
async fn publish_failure_does_not_stop_later_articles() {
    let source = source(vec![(
        "Bitcoin",
        vec![raw("Rally A", "Up"), raw("Rally B", "Up")],
    )]);
    let scorer = scorer(&[
        ("Rally A", score(0.6, 0.0)),
        ("Rally B", score(0.6, 0.0)),
        ("Up", score(0.4, 0.0)),
    ]);
    let forum = FakeForum {
        failing_submits: HashSet::from(["[BTC] Rally A".to_string()]),
        ..FakeForum::default()
    };
    let store = FakeStore::default();

    let summary = Pipeline::new(&source, &scorer, &forum, settings())
        .with_metrics(Some(&store))
        .run(&btc_topics())
        .await
        .expect("publish failures are isolated");

    assert_eq!(forum.submissions().len(), 1);
    assert_eq!(forum.submissions()[0].title, "[BTC] Rally B");
    assert!(matches!(
        summary.articles[0].outcome,
        ArticleOutcome::Failed { stage: FailedStage::Publish, .. }
    ));
    assert_eq!(summary.articles[1].outcome, ArticleOutcome::Published);
    // The failed article contributes no metric point.
    assert_eq!(summary.metrics_written, Some(1));
}

#[tokio::test]
async fn duplicate_check_failure_skips_only_that_article() {
    let source = source(vec![(
        "Bitcoin",
        vec![raw("Rally A", "Up"), raw("Rally B", "Up")],
    )]);
    let scorer = scorer(&[
        ("Rally A", score(0.6, 0.0)),
        ("Rally B", score(0.6, 0.0)),
    ]);
    let forum = FakeForum {
        failing_searches: HashSet::from(["Rally A".to_string()]),
        ..FakeForum::default()
    };

    let summary = Pipeline::new(&source, &scorer, &forum, settings())
        .run(&btc_topics())
        .await
        .unwrap();

    assert!(matches!(
        summary.articles[0].outcome,
        ArticleOutcome::Failed { stage: FailedStage::DuplicateCheck, .. }
    ));
    assert_eq!(forum.submissions().len(), 1);
}

#[tokio::test]
async fn metric_prep_failure_leaves_post_live_and_unmetered() {
    let mut undated = raw("Bitcoin surges", "Price rallies");
    undated.published_at = None;
    let source = source(vec![("Bitcoin", vec![undated])]);
    let (_, scorer) = bitcoin_surges();
    let forum = FakeForum::default();
    let store = FakeStore::default();

    let summary = Pipeline::new(&source, &scorer, &forum, settings())
        .with_metrics(Some(&store))
        .run(&btc_topics())
        .await
        .unwrap();

    assert_eq!(forum.submissions().len(), 1);
    assert!(matches!(
        summary.articles[0].outcome,
        ArticleOutcome::Failed { stage: FailedStage::MetricPrep, .. }
    ));
    assert_eq!(summary.metrics_written, Some(0));
}

#[tokio::test]
async fn failed_metrics_flush_fails_the_run() {
    let (source, scorer) = bitcoin_surges();
    let forum = FakeForum::default();
    let store = FakeStore {
        fail_writes: true,
        ..FakeStore::default()
    };

    let result = Pipeline::new(&source, &scorer, &forum, settings())
        .with_metrics(Some(&store))
        .run(&btc_topics())
        .await;

    assert!(
        matches!(result, Err(PipelineError::Influx(_))),
        "expected fatal Influx error, got: {result:?}"
    );
    // The post made before the flush stays live.
    assert_eq!(forum.submissions().len(), 1);
}

#[tokio::test]
async fn metrics_disabled_writes_nothing() {
    let (source, scorer) = bitcoin_surges();
    let forum = FakeForum::default();

    let summary = Pipeline::new(&source, &scorer, &forum, settings())
        .with_metrics(None)
        .run(&btc_topics())
        .await
        .unwrap();

    assert_eq!(summary.published(), 1);
    assert_eq!(summary.metrics_written, None);
}

#[tokio::test]
async fn search_failure_is_fatal() {
    let (mut source, scorer) = bitcoin_surges();
    source.failing_terms.insert("Bitcoin".to_string());
    let forum = FakeForum::default();

    let result = Pipeline::new(&source, &scorer, &forum, settings())
        .run(&btc_topics())
        .await;

    assert!(result.is_err());
    assert!(forum.submissions().is_empty());
}

#[tokio::test]
async fn topics_and_terms_run_in_order_over_exclusive_page_range() {
    let source = source(vec![
        ("Ethereum", vec![raw("Ether rallies", "")]),
        ("Bitcoin", vec![raw("Bitcoin surges", "")]),
        ("BTC price", vec![raw("BTC jumps", "")]),
    ]);
    let scorer = scorer(&[
        ("Ether rallies", score(0.6, 0.0)),
        ("Bitcoin surges", score(0.6, 0.0)),
        ("BTC jumps", score(0.6, 0.0)),
    ]);
    let forum = FakeForum::default();
    let topics = vec![
        Topic::new("ETH", &["Ethereum"]),
        Topic::new("BTC", &["Bitcoin", "BTC price"]),
    ];

    Pipeline::new(&source, &scorer, &forum, settings())
        .run(&topics)
        .await
        .unwrap();

    let titles: Vec<String> = forum.submissions().into_iter().map(|s| s.title).collect();
    assert_eq!(
        titles,
        ["[ETH] Ether rallies", "[BTC] Bitcoin surges", "[BTC] BTC jumps"]
    );

    let requests = source.requests.lock().unwrap();
    let bitcoin_pages: Vec<u32> = requests
        .iter()
        .filter(|(term, _)| term == "Bitcoin")
        .map(|(_, page)| *page)
        .collect();
    assert_eq!(bitcoin_pages, [1, 2, 3, 4]);
}
