use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::retry::RetryPolicy;
use super::types::{CommentDraftBody, FeedPage, LikeCreatedBody, NewCommentBody, PostDetailBody};

const COMMENTS_PATH: &str = "/api/v1/comments/";
const LIKES_PATH: &str = "/api/v1/likes/";

/// Everything needed to build the one shared HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Raw `Cookie` header value, e.g. `session=...`.
    pub cookie: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cookie: None,
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// Same-origin, credential-bearing client for the photo feed REST API.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base: Url,
    retry: RetryPolicy,
}

impl FeedClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.cookie {
            let mut value = HeaderValue::from_str(cookie)
                .map_err(|_| ApiError::InvalidUrl("cookie is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(ApiError::from)?;

        Ok(Self {
            http,
            base,
            retry: config.retry,
        })
    }

    /// Resolve a server-provided URL (usually a path) against the base URL.
    pub fn resolve(&self, target: &str) -> Result<Url, ApiError> {
        self.base
            .join(target)
            .map_err(|e| ApiError::InvalidUrl(format!("{target}: {e}")))
    }

    /// Fetch one feed page. Retried with backoff.
    pub async fn fetch_feed_page(&self, target: &str) -> Result<FeedPage, ApiError> {
        let url = self.resolve(target)?;
        self.retry
            .run("feed page", || self.get_json(url.clone()))
            .await
    }

    /// Fetch one post's full detail. Retried with backoff.
    pub async fn fetch_post_detail(&self, target: &str) -> Result<PostDetailBody, ApiError> {
        let url = self.resolve(target)?;
        self.retry
            .run("post detail", || self.get_json(url.clone()))
            .await
    }

    /// Returns the delete resource URL for the new like.
    pub async fn create_like(&self, post_id: i64) -> Result<String, ApiError> {
        let mut url = self.resolve(LIKES_PATH)?;
        url.query_pairs_mut()
            .append_pair("postid", &post_id.to_string());
        tracing::debug!(post_id, "creating like");
        let response = self.http.post(url).send().await?;
        let body: LikeCreatedBody = parse_json(check_status(response)?).await?;
        Ok(body.url)
    }

    pub async fn delete_like(&self, target: &str) -> Result<(), ApiError> {
        let url = self.resolve(target)?;
        tracing::debug!(%url, "deleting like");
        let response = self.http.delete(url).send().await?;
        check_status(response)?;
        Ok(())
    }

    pub async fn create_comment(&self, post_id: i64, text: &str) -> Result<NewCommentBody, ApiError> {
        let mut url = self.resolve(COMMENTS_PATH)?;
        url.query_pairs_mut()
            .append_pair("postid", &post_id.to_string());
        tracing::debug!(post_id, "creating comment");
        let response = self
            .http
            .post(url)
            .json(&CommentDraftBody { text })
            .send()
            .await?;
        parse_json(check_status(response)?).await
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<(), ApiError> {
        let url = self.resolve(&format!("{COMMENTS_PATH}{comment_id}/"))?;
        tracing::debug!(comment_id, "deleting comment");
        let response = self.http.delete(url).send().await?;
        check_status(response)?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        parse_json(check_status(response)?).await
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from(status))
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
}
