//! Reddit API client (password-grant OAuth for a script app).

use std::time::Duration;

use async_trait::async_trait;
use cryptosentry_core::RedditCredentials;
use serde::Deserialize;

use super::ForumClient;
use crate::error::PipelineError;

const DEFAULT_AUTH_URL: &str = "https://www.reddit.com";
const DEFAULT_API_URL: &str = "https://oauth.reddit.com";

/// Reddit OAuth token response. Reddit reports bad credentials as a 200 with `error`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    json: SubmitJson,
}

#[derive(Debug, Deserialize)]
struct SubmitJson {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

/// Reddit API client holding a user access token.
pub struct RedditClient {
    client: reqwest::Client,
    token: String,
    user_agent: String,
    api_url: String,
}

impl RedditClient {
    /// Log in against the production Reddit endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Reddit`] if the token exchange is rejected, or
    /// [`PipelineError::Http`] on network failure.
    pub async fn login(
        credentials: &RedditCredentials,
        timeout_secs: u64,
    ) -> Result<Self, PipelineError> {
        Self::login_with_base_urls(credentials, timeout_secs, DEFAULT_AUTH_URL, DEFAULT_API_URL)
            .await
    }

    /// Log in against custom endpoints (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`RedditClient::login`].
    pub async fn login_with_base_urls(
        credentials: &RedditCredentials,
        timeout_secs: u64,
        auth_url: &str,
        api_url: &str,
    ) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let token = Self::fetch_token(&client, credentials, auth_url.trim_end_matches('/')).await?;
        tracing::debug!(username = %credentials.username, "obtained Reddit access token");

        Ok(Self {
            client,
            token,
            user_agent: credentials.user_agent.clone(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_token(
        client: &reqwest::Client,
        credentials: &RedditCredentials,
        auth_url: &str,
    ) -> Result<String, PipelineError> {
        let response = client
            .post(format!("{auth_url}/api/v1/access_token"))
            .header("User-Agent", &credentials.user_agent)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PipelineError::Reddit(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }

        let token_resp: TokenResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Reddit(format!("token parse error: {e}")))?;

        match (token_resp.access_token, token_resp.error) {
            (Some(token), None) => Ok(token),
            (_, Some(error)) => Err(PipelineError::Reddit(format!(
                "token exchange rejected: {error}"
            ))),
            (None, None) => Err(PipelineError::Reddit(
                "token response missing access_token".to_string(),
            )),
        }
    }
}

#[async_trait]
impl ForumClient for RedditClient {
    async fn has_matching_post(&self, forum: &str, query: &str) -> Result<bool, PipelineError> {
        let response = self
            .client
            .get(format!("{}/r/{forum}/search", self.api_url))
            .bearer_auth(&self.token)
            .header("User-Agent", &self.user_agent)
            .query(&[
                ("q", query),
                ("restrict_sr", "true"),
                ("type", "link"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PipelineError::Reddit(format!(
                "search in r/{forum} failed with status {}",
                response.status()
            )));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|e| PipelineError::Reddit(format!("search response parse error: {e}")))?;

        Ok(!listing.data.children.is_empty())
    }

    async fn submit_link(
        &self,
        forum: &str,
        title: &str,
        url: &str,
        flair_id: &str,
    ) -> Result<(), PipelineError> {
        let response = self
            .client
            .post(format!("{}/api/submit", self.api_url))
            .bearer_auth(&self.token)
            .header("User-Agent", &self.user_agent)
            .form(&[
                ("sr", forum),
                ("kind", "link"),
                ("title", title),
                ("url", url),
                ("flair_id", flair_id),
                ("resubmit", "true"),
                ("api_type", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PipelineError::Reddit(format!(
                "submit to r/{forum} failed with status {}",
                response.status()
            )));
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Reddit(format!("submit response parse error: {e}")))?;

        if !submitted.json.errors.is_empty() {
            let errors: Vec<String> = submitted
                .json
                .errors
                .iter()
                .map(ToString::to_string)
                .collect();
            return Err(PipelineError::Reddit(format!(
                "submit to r/{forum} rejected: {}",
                errors.join("; ")
            )));
        }

        Ok(())
    }
}
