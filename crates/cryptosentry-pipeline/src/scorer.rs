//! Lexicon sentiment scorer for crypto market headlines.

use crate::types::SentimentScore;

/// Scores a piece of text into negative, neutral and positive proportions.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> SentimentScore;
}

/// Domain-specific word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("surge", 0.6),
    ("surges", 0.6),
    ("surged", 0.6),
    ("soar", 0.7),
    ("soars", 0.7),
    ("soared", 0.7),
    ("rally", 0.6),
    ("rallies", 0.6),
    ("jump", 0.5),
    ("jumps", 0.5),
    ("gain", 0.4),
    ("gains", 0.4),
    ("rise", 0.4),
    ("rises", 0.4),
    ("boost", 0.5),
    ("boosts", 0.5),
    ("bullish", 0.7),
    ("breakthrough", 0.6),
    ("adoption", 0.4),
    ("approved", 0.5),
    ("approval", 0.5),
    ("partnership", 0.4),
    ("upgrade", 0.4),
    ("growth", 0.4),
    ("recovery", 0.4),
    ("recovers", 0.4),
    ("optimism", 0.5),
    ("optimistic", 0.5),
    ("strong", 0.4),
    ("success", 0.5),
    ("win", 0.4),
    ("good", 0.3),
    ("great", 0.4),
    ("best", 0.5),
    // Negative signals
    ("crash", -0.7),
    ("crashes", -0.7),
    ("plunge", -0.7),
    ("plunges", -0.7),
    ("plummets", -0.7),
    ("slump", -0.6),
    ("slumps", -0.6),
    ("selloff", -0.6),
    ("drop", -0.4),
    ("drops", -0.4),
    ("fall", -0.4),
    ("falls", -0.4),
    ("decline", -0.4),
    ("declines", -0.4),
    ("bearish", -0.7),
    ("hack", -0.7),
    ("hacked", -0.7),
    ("exploit", -0.6),
    ("theft", -0.7),
    ("scam", -0.8),
    ("fraud", -0.8),
    ("ban", -0.6),
    ("banned", -0.6),
    ("lawsuit", -0.5),
    ("sued", -0.5),
    ("collapse", -0.8),
    ("crisis", -0.7),
    ("fear", -0.5),
    ("fears", -0.5),
    ("loss", -0.5),
    ("losses", -0.5),
    ("liquidation", -0.5),
    ("liquidations", -0.5),
    ("warning", -0.4),
    ("risk", -0.3),
    ("failed", -0.4),
    ("bad", -0.4),
    ("worst", -0.6),
];

/// Scorer backed by [`LEXICON`].
///
/// Each matched word adds `|weight| + 1` to its polarity and every other word
/// adds `1` to neutral. Components are reported as their share of the total,
/// rounded to three decimals. Empty text scores all zeros.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> SentimentScore {
        let mut pos_sum = 0.0_f64;
        let mut neg_sum = 0.0_f64;
        let mut neu_count = 0.0_f64;

        for word in text.split_whitespace() {
            let w = word
                .trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase();
            if w.is_empty() {
                continue;
            }
            match word_weight(&w) {
                Some(weight) if weight > 0.0 => pos_sum += weight + 1.0,
                Some(weight) => neg_sum += -weight + 1.0,
                None => neu_count += 1.0,
            }
        }

        let total = pos_sum + neg_sum + neu_count;
        if total <= 0.0 {
            return SentimentScore::default();
        }

        SentimentScore {
            neg: round3(neg_sum / total),
            neu: round3(neu_count / total),
            pos: round3(pos_sum / total),
        }
    }
}

fn word_weight(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|&&(lex_word, _)| lex_word == word)
        .map(|&(_, weight)| weight)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
