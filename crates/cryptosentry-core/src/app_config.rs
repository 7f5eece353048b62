use std::path::PathBuf;

/// Credentials for the Reddit script app that owns the posting account.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl std::fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Link flair template ids, provisioned out of band in the subreddit mod tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlairIds {
    pub positive: String,
    pub negative: String,
}

/// News search window and pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Lookback window such as `24h` or `7d`.
    pub period: String,
    /// Page-count limit. Pages `1..pages` are fetched.
    pub pages: u32,
    pub language: String,
}

/// InfluxDB target. Present only when `CRYPTOSENTRY_INFLUX_URL` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsStoreConfig {
    pub url: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub reddit: RedditCredentials,
    pub subreddit: String,
    pub flairs: FlairIds,
    pub search: SearchSettings,
    pub topics_path: Option<PathBuf>,
    pub metrics: Option<MetricsStoreConfig>,
    pub http_timeout_secs: u64,
    pub log_level: String,
}
