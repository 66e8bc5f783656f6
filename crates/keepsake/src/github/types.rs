//! Wire types for `GET /search/repositories`.

use serde::Deserialize;

use crate::source::SourceRepository;

/// Body of a repository search response.
///
/// Only `items` is read; `total_count` and `incomplete_results` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub items: Vec<SourceRepository>,
}

/// Error body GitHub sends with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}
