use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A tracked asset: its ticker symbol and the news search terms for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub symbol: String,
    pub terms: Vec<String>,
}

impl Topic {
    #[must_use]
    pub fn new(symbol: &str, terms: &[&str]) -> Self {
        Self {
            symbol: symbol.to_string(),
            terms: terms.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TopicsFile {
    pub topics: Vec<Topic>,
}

/// The built-in topic set, in run order.
#[must_use]
pub fn default_topics() -> Vec<Topic> {
    vec![
        Topic::new("XLM", &["Stellar Lumens"]),
        Topic::new("ETH", &["Ethereum"]),
        Topic::new("ADA", &["Cardano"]),
        Topic::new("BTC", &["Bitcoin"]),
    ]
}

/// Load and validate a topic set from a YAML file.
///
/// ```yaml
/// topics:
///   - symbol: BTC
///     terms: ["Bitcoin"]
/// ```
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_topics(path: &Path) -> Result<Vec<Topic>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TopicsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let topics_file: TopicsFile = serde_yaml::from_str(&content)?;
    validate_topics(&topics_file.topics)?;

    Ok(topics_file.topics)
}

fn validate_topics(topics: &[Topic]) -> Result<(), ConfigError> {
    if topics.is_empty() {
        return Err(ConfigError::Validation(
            "topics file must list at least one topic".to_string(),
        ));
    }

    let mut seen_symbols = HashSet::new();
    for topic in topics {
        if topic.symbol.trim().is_empty() {
            return Err(ConfigError::Validation(
                "topic symbol must be non-empty".to_string(),
            ));
        }

        if !seen_symbols.insert(topic.symbol.to_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate topic symbol: '{}'",
                topic.symbol
            )));
        }

        if topic.terms.is_empty() || topic.terms.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "topic '{}' must have at least one non-empty search term",
                topic.symbol
            )));
        }
    }

    Ok(())
}
