//! Transport seam for outbound HTTP.
//!
//! Search only ever issues `GET`s, so a request is just a URL and headers.
//! Every send takes a [`CancellationToken`]; cancelling it abandons the
//! request and resolves to [`HttpError::Cancelled`].

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// HTTP headers represented as key/value pairs.
///
/// Header names are treated case-insensitively by helper functions.
pub type HttpHeaders = Vec<(String, String)>;

/// A `GET` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HttpHeaders,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("request was cancelled")]
    Cancelled,

    #[error("no mock response registered for {url}")]
    NoMockResponse { url: String },
}

/// Transport boundary for all HTTP I/O.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        request: HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, HttpError>;
}

/// Get the first header value matching `name` (case-insensitive).
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(feature = "github")]
pub mod reqwest_transport {
    use super::*;

    /// A real HTTP transport backed by reqwest.
    #[derive(Clone, Default)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(client: reqwest::Client) -> Self {
            Self { client }
        }

        async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
            let mut builder = self.client.get(&request.url);
            for (k, v) in request.headers {
                builder = builder.header(&k, &v);
            }

            let resp = builder
                .send()
                .await
                .map_err(|e| HttpError::Transport(e.to_string()))?;

            let status = resp.status().as_u16();
            let headers: HttpHeaders = resp
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        value.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();

            let body = resp
                .bytes()
                .await
                .map_err(|e| HttpError::Transport(e.to_string()))?
                .to_vec();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(
            &self,
            request: HttpRequest,
            cancel: &CancellationToken,
        ) -> Result<HttpResponse, HttpError> {
            tokio::select! {
                biased;
                () = cancel.cancelled() => Err(HttpError::Cancelled),
                result = self.fetch(request) => result,
            }
        }
    }
}

// ---------- Test-only mock transport ----------

#[cfg(test)]
pub(crate) use mock::MockTransport;

#[cfg(test)]
mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use super::*;

    /// In-memory transport with optional latency, so tests can race
    /// timeouts and cancellation against a response.
    #[derive(Clone, Default)]
    pub(crate) struct MockTransport {
        inner: Arc<Mutex<Inner>>,
        delay: Option<Duration>,
    }

    #[derive(Default)]
    struct Inner {
        routes: HashMap<String, VecDeque<HttpResponse>>,
        requests: Vec<HttpRequest>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Register a response for a URL. Repeated URLs are served FIFO.
        pub(crate) fn push_response(&self, url: impl Into<String>, response: HttpResponse) {
            self.inner
                .lock()
                .expect("mock transport lock")
                .routes
                .entry(url.into())
                .or_default()
                .push_back(response);
        }

        pub(crate) fn push_json(&self, url: impl Into<String>, status: u16, body: &str) {
            self.push_response(
                url,
                HttpResponse {
                    status,
                    headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                    body: body.as_bytes().to_vec(),
                },
            );
        }

        pub(crate) fn requests(&self) -> Vec<HttpRequest> {
            self.inner.lock().expect("mock transport lock").requests.clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn send(
            &self,
            request: HttpRequest,
            cancel: &CancellationToken,
        ) -> Result<HttpResponse, HttpError> {
            let response = {
                let mut inner = self.inner.lock().expect("mock transport lock");
                let url = request.url.clone();
                inner.requests.push(request);
                inner
                    .routes
                    .get_mut(&url)
                    .and_then(VecDeque::pop_front)
                    .ok_or(HttpError::NoMockResponse { url })
            };

            if let Some(delay) = self.delay {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(HttpError::Cancelled),
                    () = tokio::time::sleep(delay) => {}
                }
            } else if cancel.is_cancelled() {
                return Err(HttpError::Cancelled);
            }
            response
        }
    }
}
