// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request/Response interceptor trait and chain
//!
//! Every interceptor has a success and a failure handler on each side of
//! the exchange. Outcomes flow through the chain like a promise chain: a
//! failure handler may recover, and anything it does not handle is passed
//! on unchanged.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::http::{Body, Request, Response};

/// Interceptor hooks invoked on every exchange
///
/// # Example
///
/// ```rust,no_run
/// use panel_client::network::Interceptor;
/// use panel_client::http::Request;
/// use panel_client::Result;
/// use async_trait::async_trait;
///
/// struct Lang;
///
/// #[async_trait]
/// impl Interceptor for Lang {
///     async fn on_request(&self, request: &mut Request) -> Result<()> {
///         request.set_header("accept-language", "en-US")
///     }
/// }
/// ```
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Called with the outgoing request
    async fn on_request(&self, _request: &mut Request) -> Result<()> {
        Ok(())
    }

    /// Called when building the request already failed upstream
    async fn on_request_error(&self, error: Error) -> Result<Request> {
        Err(error)
    }

    /// Called with a successful (2xx) response
    async fn on_response(&self, response: Response) -> Result<Response> {
        Ok(response)
    }

    /// Called with a failed exchange; may recover it into a response
    async fn on_response_error(&self, error: Error) -> Result<Response> {
        Err(error)
    }

    /// Priority - higher priority interceptors run first
    fn priority(&self) -> i32 {
        0
    }

    /// Name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Interceptor chain - runs interceptors in priority order
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an interceptor
    pub fn add<I: Interceptor + 'static>(&mut self, interceptor: I) {
        self.add_arc(Arc::new(interceptor));
    }

    /// Add a shared interceptor
    pub fn add_arc(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
        // Stable sort keeps registration order within a priority
        self.interceptors.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// Number of registered interceptors
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Interceptor names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Run the request side of the chain
    pub async fn process_request(&self, request: Result<Request>) -> Result<Request> {
        let mut outcome = request;
        for interceptor in &self.interceptors {
            outcome = match outcome {
                Ok(mut request) => interceptor.on_request(&mut request).await.map(|()| request),
                Err(error) => interceptor.on_request_error(error).await,
            };
        }
        outcome
    }

    /// Run the response side of the chain
    pub async fn process_response(&self, response: Result<Response>) -> Result<Response> {
        let mut outcome = response;
        for interceptor in &self.interceptors {
            outcome = match outcome {
                Ok(response) => interceptor.on_response(response).await,
                Err(error) => interceptor.on_response_error(error).await,
            };
        }
        outcome
    }
}

/// Request logger interceptor
#[derive(Debug, Clone, Default)]
pub struct RequestLogger {
    /// Log request bodies
    pub log_bodies: bool,
    /// Log response bodies
    pub log_responses: bool,
    /// Filter by URL fragment
    pub url_filter: Option<String>,
}

impl RequestLogger {
    fn matches(&self, url: &str) -> bool {
        self.url_filter
            .as_ref()
            .map(|filter| url.contains(filter.as_str()))
            .unwrap_or(true)
    }
}

#[async_trait]
impl Interceptor for RequestLogger {
    async fn on_request(&self, request: &mut Request) -> Result<()> {
        if !self.matches(&request.url) {
            return Ok(());
        }

        tracing::info!(method = %request.method, url = %request.url, "Request");

        if self.log_bodies {
            match &request.body {
                Body::Text(text) => tracing::debug!(body = %text, "Request body"),
                Body::Json(value) => tracing::debug!(body = %value, "Request body"),
                Body::Multipart(form) => tracing::debug!(parts = form.len(), "Request body"),
                Body::Bytes(bytes) => tracing::debug!(len = bytes.len(), "Request body"),
                Body::Empty => {}
            }
        }

        Ok(())
    }

    async fn on_response(&self, response: Response) -> Result<Response> {
        if self.matches(response.url_str()) {
            tracing::info!(
                url = %response.url,
                status = %response.status,
                time_ms = response.response_time_ms,
                "Response"
            );

            if self.log_responses {
                tracing::debug!(body = %response.text_lossy(), "Response body");
            }
        }

        Ok(response)
    }

    async fn on_response_error(&self, error: Error) -> Result<Response> {
        if self.matches(error.url().unwrap_or_default()) {
            tracing::warn!(status = ?error.status_code(), error = %error, "Request failed");
        }
        Err(error)
    }

    fn priority(&self) -> i32 {
        -100 // Low priority - run logging last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;
    use url::Url;

    /// Records the order it was called in
    struct Tag {
        tag: &'static str,
        priority: i32,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Interceptor for Tag {
        async fn on_request(&self, request: &mut Request) -> Result<()> {
            self.seen.lock().push(self.tag);
            request.set_header("x-last", self.tag)
        }

        fn priority(&self) -> i32 {
            self.priority
        }
    }

    /// Recovers every failure into a fixed response
    struct Recover;

    #[async_trait]
    impl Interceptor for Recover {
        async fn on_response_error(&self, _error: Error) -> Result<Response> {
            Ok(Response::new(
                StatusCode::NO_CONTENT,
                HeaderMap::new(),
                Bytes::new(),
                Url::parse("https://panel.example/").unwrap(),
                false,
                0,
            ))
        }
    }

    fn tag(tag: &'static str, priority: i32, seen: &Arc<Mutex<Vec<&'static str>>>) -> Tag {
        Tag {
            tag,
            priority,
            seen: seen.clone(),
        }
    }

    #[tokio::test]
    async fn test_priority_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut chain = InterceptorChain::new();
        chain.add(tag("low", -10, &seen));
        chain.add(tag("first", 0, &seen));
        chain.add(tag("high", 10, &seen));
        chain.add(tag("second", 0, &seen));

        let request = chain.process_request(Ok(Request::get("/"))).await.unwrap();

        assert_eq!(*seen.lock(), vec!["high", "first", "second", "low"]);
        assert_eq!(request.headers.get("x-last").unwrap(), "low");
    }

    #[test]
    fn test_request_error_passes_through() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut chain = InterceptorChain::new();
        chain.add(tag("never", 0, &seen));
        chain.add(RequestLogger::default());

        let err = tokio_test::block_on(
            chain.process_request(Err(Error::invalid_header("bad name", "invalid"))),
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidHeader { ref name, .. } if name == "bad name"));
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_response_error_recovered() {
        let mut chain = InterceptorChain::new();
        chain.add(RequestLogger::default());
        chain.add(Recover);

        let response = chain
            .process_response(Err(Error::other("connection reset")))
            .await
            .unwrap();
        assert_eq!(response.status_code(), 204);
    }

    #[test]
    fn test_logger_filter() {
        let logger = RequestLogger {
            url_filter: Some("/panel/api/".to_string()),
            ..Default::default()
        };
        assert!(logger.matches("https://panel.example/panel/api/inbounds"));
        assert!(!logger.matches("https://panel.example/login"));
        assert!(RequestLogger::default().matches("anything"));
    }
}
