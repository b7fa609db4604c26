use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::news::story::{SearchResponse, Story, dedupe_stories, normalize_story, sanitize_text};

/// Recent stories tagged as news that match the AI tooling query.
pub const DEFAULT_UPSTREAM_URL: &str =
    "https://hn.algolia.com/api/v1/search_by_date?tags=story&hitsPerPage=20&query=AI%20tool";
pub const DEFAULT_KEYWORD: &str = "ai";
pub const DEFAULT_MAX_STORIES: usize = 12;

/// Upstream request and curation options.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub upstream_url: String,
    /// Literal, case-insensitive substring a title must contain.
    pub keyword: String,
    /// Cap applied after filtering and before normalization.
    pub max_stories: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_owned(),
            keyword: DEFAULT_KEYWORD.to_owned(),
            max_stories: DEFAULT_MAX_STORIES,
            timeout: Duration::from_secs(15),
            user_agent: concat!("newsreel/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> NewsreelResult<()> {
        url::Url::parse(&self.upstream_url).map_err(|e| {
            NewsreelError::validation(format!(
                "upstream url '{}' is invalid: {e}",
                self.upstream_url
            ))
        })?;
        if self.keyword.trim().is_empty() {
            return Err(NewsreelError::validation("topical keyword must be non-empty"));
        }
        if self.max_stories == 0 {
            return Err(NewsreelError::validation("max_stories must be >= 1"));
        }
        if self.timeout.is_zero() {
            return Err(NewsreelError::validation("upstream timeout must be non-zero"));
        }
        Ok(())
    }
}

/// Filter, cap, normalize and dedupe an upstream payload.
///
/// Pure: identical payloads always yield identical output.
pub fn curate(payload: &SearchResponse, cfg: &GatewayConfig) -> Vec<Story> {
    let keyword = cfg.keyword.trim().to_lowercase();
    let normalized = payload
        .hits
        .iter()
        // Match against the title as it will be displayed, after tag and entity cleanup.
        .filter(|raw| {
            raw.title
                .as_deref()
                .is_some_and(|t| sanitize_text(t).to_lowercase().contains(&keyword))
        })
        .take(cfg.max_stories)
        .enumerate()
        .map(|(ordinal, raw)| normalize_story(raw, ordinal));
    dedupe_stories(normalized)
}

/// Client for the upstream news source.
#[derive(Clone, Debug)]
pub struct NewsGateway {
    client: reqwest::Client,
    cfg: GatewayConfig,
}

impl NewsGateway {
    pub fn new(cfg: GatewayConfig) -> NewsreelResult<Self> {
        cfg.validate()?;
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| NewsreelError::validation(format!("failed to build http client: {e}")))?;
        Ok(Self { client, cfg })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.cfg
    }

    /// Issue one upstream request and return the curated story list.
    ///
    /// Any failure yields [`NewsreelError::Upstream`]; callers never see a partial list.
    #[tracing::instrument(skip(self), fields(url = %self.cfg.upstream_url))]
    pub async fn fetch_stories(&self) -> NewsreelResult<Vec<Story>> {
        let response = self
            .client
            .get(&self.cfg.upstream_url)
            .send()
            .await
            .map_err(|e| NewsreelError::upstream(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NewsreelError::upstream(format!(
                "upstream returned {status}"
            )));
        }

        let payload: SearchResponse = response
            .json()
            .await
            .map_err(|e| NewsreelError::upstream(format!("invalid upstream payload: {e}")))?;

        let stories = curate(&payload, &self.cfg);
        tracing::info!(
            hits = payload.hits.len(),
            stories = stories.len(),
            "fetched stories"
        );
        Ok(stories)
    }
}

/// [`NewsGateway`] with a revalidation window: a successful fetch is reused until it is older
/// than `revalidate`. Failures are never cached.
#[derive(Clone, Debug)]
pub struct CachedGateway {
    inner: NewsGateway,
    revalidate: Duration,
    slot: Arc<Mutex<Option<CachedStories>>>,
}

#[derive(Debug)]
struct CachedStories {
    fetched_at: Instant,
    stories: Arc<Vec<Story>>,
}

impl CachedGateway {
    pub fn new(inner: NewsGateway, revalidate: Duration) -> Self {
        Self {
            inner,
            revalidate,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn fetch_stories(&self) -> NewsreelResult<Arc<Vec<Story>>> {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref()
            && cached.fetched_at.elapsed() < self.revalidate
        {
            tracing::debug!(stories = cached.stories.len(), "serving cached stories");
            return Ok(cached.stories.clone());
        }

        let stories = Arc::new(self.inner.fetch_stories().await?);
        *slot = Some(CachedStories {
            fetched_at: Instant::now(),
            stories: stories.clone(),
        });
        Ok(stories)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/news/gateway.rs"]
mod tests;
