//! GitHub repository search.
//!
//! # Module Structure
//!
//! - [`error`] - Error type for search requests
//! - [`types`] - Wire types for the search endpoint
//! - [`client`] - One cancellable, timeout-bounded page fetch
//! - [`session`] - Query and paging state over the client
//!
//! ```ignore
//! use keepsake::github::{GitHubSearchClient, SearchOptions, SearchSession};
//!
//! let session = SearchSession::new(GitHubSearchClient::new(SearchOptions::default()));
//! session.submit_query("tokio").await;
//! session.load_next_page().await;
//! for repo in session.results() {
//!     println!("{} ({} stars)", repo.full_name(), repo.star_count);
//! }
//! ```

mod client;
mod error;
mod session;
mod types;

pub use client::{
    DEFAULT_API_BASE_URL, DEFAULT_PER_PAGE, DEFAULT_SEARCH_TIMEOUT, GitHubSearchClient,
    SearchOptions,
};
pub use error::SearchError;
pub use session::{LoadingState, SearchSession, SearchSnapshot};
pub use types::SearchResponse;
