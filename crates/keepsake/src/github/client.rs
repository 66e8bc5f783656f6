//! Fetching one page of repository search results.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use super::error::SearchError;
use super::types::{ApiErrorBody, SearchResponse};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use crate::source::SourceRepository;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Results requested per page.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Upper bound on a single page fetch, including body download.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const USER_AGENT: &str = concat!("keepsake/", env!("CARGO_PKG_VERSION"));

/// Search client settings.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub api_base_url: String,
    pub per_page: u32,
    pub timeout: Duration,
    /// Optional token, sent as a bearer credential for higher rate limits.
    pub token: Option<String>,
    pub user_agent: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            timeout: DEFAULT_SEARCH_TIMEOUT,
            token: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Client for `GET /search/repositories`, sorted by stars.
pub struct GitHubSearchClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    options: SearchOptions,
}

impl GitHubSearchClient<ReqwestTransport> {
    pub fn new(options: SearchOptions) -> Self {
        Self::with_transport(ReqwestTransport::default(), options)
    }
}

impl<T: HttpTransport> GitHubSearchClient<T> {
    pub fn with_transport(transport: T, options: SearchOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// URL for `page` (1-based) of results for `query`.
    pub fn search_url(&self, query: &str, page: u32) -> Result<Url, SearchError> {
        let base = self.options.api_base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/search/repositories"))
            .map_err(|e| SearchError::InvalidUrl(format!("{base}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(SearchError::InvalidUrl(base.to_string()));
        }
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("sort", "stars")
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &self.options.per_page.to_string());
        Ok(url)
    }

    /// Fetch one page of results, in the order GitHub returns them.
    ///
    /// The request is abandoned when `cancel` fires or the configured
    /// timeout elapses, whichever is first.
    pub async fn fetch_repositories(
        &self,
        query: &str,
        page: u32,
        cancel: &CancellationToken,
    ) -> Result<Vec<SourceRepository>, SearchError> {
        let url = self.search_url(query, page)?;
        let mut request = HttpRequest::get(url.as_str())
            .header("Accept", GITHUB_ACCEPT)
            .header("User-Agent", self.options.user_agent.as_str());
        if let Some(token) = &self.options.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        tracing::debug!(query, page, "Searching repositories");
        let attempt = cancel.child_token();
        let timeout = self.options.timeout;

        let result = tokio::select! {
            biased;
            result = self.transport.send(request, &attempt) => result,
            () = tokio::time::sleep(timeout) => {
                attempt.cancel();
                tracing::warn!(query, page, timeout_secs = timeout.as_secs(), "Search timed out");
                return Err(SearchError::Timeout(timeout));
            }
        };

        let response = result.map_err(|e| match e {
            HttpError::Cancelled => SearchError::Cancelled,
            other => SearchError::Network(other.to_string()),
        })?;

        let items = decode(&response)?;
        tracing::debug!(query, page, count = items.len(), "Search page received");
        Ok(items)
    }
}

fn decode(response: &HttpResponse) -> Result<Vec<SourceRepository>, SearchError> {
    if !response.is_success() {
        let message = serde_json::from_slice::<ApiErrorBody>(&response.body)
            .map(|body| body.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&response.body).trim().to_string());
        return Err(SearchError::Status {
            status: response.status,
            message,
        });
    }

    serde_json::from_slice::<SearchResponse>(&response.body)
        .map(|body| body.items)
        .map_err(|e| SearchError::Decode(e.to_string()))
}
