//! Query and paging state for an interactive search.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use super::client::GitHubSearchClient;
use super::error::SearchError;
use crate::http::HttpTransport;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::source::SourceRepository;

/// What a results view should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingState {
    /// No query yet.
    #[default]
    Idle,
    Loading,
    /// The last fetch failed; re-submitting the query retries.
    Error,
    /// The query matched nothing.
    Empty,
    Loaded,
}

/// Point-in-time copy of a session's state.
#[derive(Debug, Clone, Default)]
pub struct SearchSnapshot {
    pub query: String,
    /// Next page to fetch (1-based).
    pub next_page: u32,
    pub state: LoadingState,
    pub results: Vec<SourceRepository>,
    pub error: Option<SearchError>,
    /// Whether the last page came back short.
    pub exhausted: bool,
}

struct InFlight {
    generation: u64,
    cancel: CancellationToken,
}

#[derive(Default)]
struct State {
    snapshot: SearchSnapshot,
    seen: HashSet<String>,
    generation: u64,
    in_flight: Option<InFlight>,
}

/// A search query being paged through.
///
/// Submitting a new query cancels whatever request is still running for the
/// old one; results of a superseded request are dropped rather than appended.
pub struct SearchSession<T: HttpTransport = ReqwestTransport> {
    client: GitHubSearchClient<T>,
    state: Mutex<State>,
}

impl<T: HttpTransport> SearchSession<T> {
    pub fn new(client: GitHubSearchClient<T>) -> Self {
        Self {
            client,
            state: Mutex::new(State {
                snapshot: SearchSnapshot {
                    next_page: 1,
                    ..SearchSnapshot::default()
                },
                ..State::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.lock().snapshot.clone()
    }

    pub fn state(&self) -> LoadingState {
        self.lock().snapshot.state
    }

    pub fn results(&self) -> Vec<SourceRepository> {
        self.lock().snapshot.results.clone()
    }

    /// Start a new query from page 1, abandoning any request in flight.
    ///
    /// A blank query resets to [`LoadingState::Idle`] without a request.
    pub async fn submit_query(&self, query: &str) -> LoadingState {
        {
            let mut state = self.lock();
            if let Some(in_flight) = state.in_flight.take() {
                tracing::debug!(generation = in_flight.generation, "Cancelling superseded search");
                in_flight.cancel.cancel();
            }
            state.generation += 1;
            state.seen.clear();
            state.snapshot = SearchSnapshot {
                query: query.trim().to_string(),
                next_page: 1,
                ..SearchSnapshot::default()
            };
            if state.snapshot.query.is_empty() {
                return LoadingState::Idle;
            }
        }
        self.fetch_next().await
    }

    /// Fetch and append the next page.
    ///
    /// Ignored while a request is already running, when there is no query,
    /// or once a short page has signalled the end of the results.
    pub async fn load_next_page(&self) -> LoadingState {
        {
            let state = self.lock();
            if state.in_flight.is_some()
                || state.snapshot.query.is_empty()
                || state.snapshot.exhausted
            {
                return state.snapshot.state;
            }
        }
        self.fetch_next().await
    }

    async fn fetch_next(&self) -> LoadingState {
        let (generation, cancel, query, page) = {
            let mut state = self.lock();
            state.generation += 1;
            let generation = state.generation;
            let cancel = CancellationToken::new();
            state.in_flight = Some(InFlight {
                generation,
                cancel: cancel.clone(),
            });
            state.snapshot.state = LoadingState::Loading;
            state.snapshot.error = None;
            (
                generation,
                cancel,
                state.snapshot.query.clone(),
                state.snapshot.next_page,
            )
        };

        let result = self.client.fetch_repositories(&query, page, &cancel).await;

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(query = %query, page, "Discarding results of superseded search");
            return state.snapshot.state;
        }
        state.in_flight = None;

        match result {
            Ok(items) => {
                let fetched = items.len();
                let State { snapshot, seen, .. } = &mut *state;
                for repo in items {
                    if seen.insert(repo.unique_id()) {
                        snapshot.results.push(repo);
                    }
                }
                snapshot.exhausted = fetched < self.client.options().per_page as usize;
                if fetched > 0 {
                    snapshot.next_page += 1;
                }
                snapshot.state = if snapshot.results.is_empty() {
                    LoadingState::Empty
                } else {
                    LoadingState::Loaded
                };
            }
            Err(e) => {
                tracing::warn!(query = %query, page, error = %e, "Search failed");
                state.snapshot.error = Some(e);
                state.snapshot.state = LoadingState::Error;
            }
        }
        state.snapshot.state
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::github::SearchOptions;
    use crate::http::MockTransport;

    const BASE: &str = "https://api.test";

    fn options(per_page: u32) -> SearchOptions {
        SearchOptions {
            api_base_url: BASE.to_string(),
            per_page,
            ..SearchOptions::default()
        }
    }

    fn session(transport: MockTransport, per_page: u32) -> SearchSession<MockTransport> {
        SearchSession::new(GitHubSearchClient::with_transport(transport, options(per_page)))
    }

    fn url(query: &str, page: u32, per_page: u32) -> String {
        GitHubSearchClient::with_transport(MockTransport::new(), options(per_page))
            .search_url(query, page)
            .expect("url")
            .to_string()
    }

    fn body(ids: &[i64]) -> String {
        let items: Vec<_> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "name": format!("repo-{id}"),
                    "stargazers_count": 1,
                    "owner": {"login": "octocat", "avatar_url": "https://example.com/a.png"}
                })
            })
            .collect();
        serde_json::json!({ "items": items }).to_string()
    }

    fn ids(session: &SearchSession<MockTransport>) -> Vec<String> {
        session.results().into_iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn blank_query_stays_idle_without_requests() {
        let transport = MockTransport::new();
        let session = session(transport.clone(), 2);

        assert_eq!(session.submit_query("   ").await, LoadingState::Idle);
        assert_eq!(session.load_next_page().await, LoadingState::Idle);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn pages_append_and_skip_duplicates() {
        let transport = MockTransport::new();
        transport.push_json(url("rust", 1, 2), 200, &body(&[1, 2]));
        transport.push_json(url("rust", 2, 2), 200, &body(&[2, 3]));
        transport.push_json(url("rust", 3, 2), 200, &body(&[]));
        let session = session(transport, 2);

        assert_eq!(session.submit_query("rust").await, LoadingState::Loaded);
        assert_eq!(session.load_next_page().await, LoadingState::Loaded);
        assert_eq!(ids(&session), vec!["1", "2", "3"]);
        assert_eq!(session.snapshot().next_page, 3);

        assert_eq!(session.load_next_page().await, LoadingState::Loaded);
        assert!(session.snapshot().exhausted);
        assert_eq!(ids(&session), vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn no_matches_is_empty() {
        let transport = MockTransport::new();
        transport.push_json(url("zzz", 1, 30), 200, &body(&[]));
        let session = session(transport, 30);

        assert_eq!(session.submit_query("zzz").await, LoadingState::Empty);
    }

    #[tokio::test]
    async fn failure_is_an_error_state_and_resubmitting_retries() {
        let transport = MockTransport::new();
        transport.push_json(url("x", 1, 30), 500, r#"{"message":"boom"}"#);
        transport.push_json(url("x", 1, 30), 200, &body(&[7]));
        let session = session(transport, 30);

        assert_eq!(session.submit_query("x").await, LoadingState::Error);
        let error = session.snapshot().error.expect("error recorded");
        assert!(error.is_retryable());

        assert_eq!(session.submit_query("x").await, LoadingState::Loaded);
        assert_eq!(ids(&session), vec!["7"]);
        assert!(session.snapshot().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn new_query_cancels_and_discards_old_one() {
        let transport = MockTransport::new().with_delay(Duration::from_secs(5));
        transport.push_json(url("old", 1, 30), 200, &body(&[1]));
        transport.push_json(url("new", 1, 30), 200, &body(&[2]));
        let session = Arc::new(session(transport, 30));

        let stale = tokio::spawn({
            let session = session.clone();
            async move { session.submit_query("old").await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(session.state(), LoadingState::Loading);

        assert_eq!(session.submit_query("new").await, LoadingState::Loaded);
        stale.await.expect("join");

        assert_eq!(ids(&session), vec!["2"]);
        assert_eq!(session.snapshot().query, "new");
    }

    #[tokio::test(start_paused = true)]
    async fn next_page_is_ignored_while_loading() {
        let transport = MockTransport::new().with_delay(Duration::from_secs(2));
        transport.push_json(url("x", 1, 30), 200, &body(&[1]));
        let session = Arc::new(session(transport.clone(), 30));

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.submit_query("x").await }
        });
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(session.load_next_page().await, LoadingState::Loading);
        assert_eq!(first.await.expect("join"), LoadingState::Loaded);
        assert_eq!(transport.requests().len(), 1);
    }
}
