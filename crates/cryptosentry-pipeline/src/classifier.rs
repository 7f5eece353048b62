//! Title/description score combination and the positive/negative filter.

use crate::scorer::SentimentScorer;
use crate::types::{Classification, ClassifiedArticle, RawArticle, SentimentScore};

/// Minimum combined share a polarity needs before an article is kept.
pub const SENTIMENT_THRESHOLD: f64 = 0.1;

type Rule = (Classification, fn(&SentimentScore) -> bool);

/// Ordered decision table. The first matching rule wins, so Positive takes ties.
const DECISION_TABLE: [Rule; 2] = [
    (Classification::Positive, is_positive),
    (Classification::Negative, is_negative),
];

fn is_positive(score: &SentimentScore) -> bool {
    score.pos > SENTIMENT_THRESHOLD && score.pos >= score.neg
}

fn is_negative(score: &SentimentScore) -> bool {
    score.neg > SENTIMENT_THRESHOLD
}

/// Classify a combined score. `None` means the article is too neutral to keep.
#[must_use]
pub fn classify(score: &SentimentScore) -> Option<Classification> {
    DECISION_TABLE
        .iter()
        .find(|(_, matches)| matches(score))
        .map(|&(classification, _)| classification)
}

/// Average title and description scores component by component.
#[must_use]
pub fn combine_scores(title: &SentimentScore, description: &SentimentScore) -> SentimentScore {
    SentimentScore {
        neg: average(title.neg, description.neg),
        neu: average(title.neu, description.neu),
        pos: average(title.pos, description.pos),
    }
}

fn average(a: f64, b: f64) -> f64 {
    let sum = a + b;
    if sum > 0.0 {
        sum / 2.0
    } else {
        0.0
    }
}

/// Score and classify one article; `None` if it is dropped.
pub fn classify_article<S>(scorer: &S, raw: RawArticle) -> Option<ClassifiedArticle>
where
    S: SentimentScorer + ?Sized,
{
    let title = scorer.score(&raw.title);
    let description = scorer.score(&raw.description);
    let sentiment = combine_scores(&title, &description);

    let classification = classify(&sentiment)?;
    Some(ClassifiedArticle {
        raw,
        sentiment,
        classification,
    })
}

/// Keep the articles that carry enough sentiment, preserving their order.
pub fn classify_articles<S>(scorer: &S, articles: Vec<RawArticle>) -> Vec<ClassifiedArticle>
where
    S: SentimentScorer + ?Sized,
{
    articles
        .into_iter()
        .filter_map(|raw| classify_article(scorer, raw))
        .collect()
}
