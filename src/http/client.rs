// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use url::Url;

use super::body::{Body, FormData};
use super::content_types::JSON;
use super::defaults::DefaultHeaders;
use super::qs::ArrayFormat;
use super::request::{Encoding, Request};
use super::response::Response;
use super::{DEFAULT_USER_AGENT, PANEL_API_MARKER};
use crate::error::{Error, Result};
use crate::network::{
    ContentNegotiator, Interceptor, InterceptorChain, SessionCallback, SessionExpired,
    SessionGuard,
};

/// HTTP client configuration
///
/// Fixed once the client is built; two clients never share defaults.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base for relative request targets
    pub base_url: Option<Url>,
    /// User agent string
    pub user_agent: String,
    /// Default timeout
    pub timeout: Duration,
    /// Maximum redirects to follow
    pub max_redirects: usize,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Keep session cookies between requests
    pub cookie_store: bool,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Default headers
    pub defaults: DefaultHeaders,
    /// Path fragments of endpoints that take JSON bodies
    pub json_path_markers: Vec<String>,
    /// Array format for urlencoded bodies
    pub array_format: ArrayFormat,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            accept_invalid_certs: false,
            cookie_store: true,
            proxy: None,
            defaults: DefaultHeaders::panel(),
            json_path_markers: vec![PANEL_API_MARKER.to_string()],
            array_format: ArrayFormat::Repeat,
        }
    }
}

impl HttpClientConfig {
    /// Create a new config with panel defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(base_url.as_ref())?);
        Ok(self)
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Replace the default headers
    pub fn defaults(mut self, defaults: DefaultHeaders) -> Self {
        self.defaults = defaults;
        self
    }

    /// Add a JSON path marker
    pub fn json_path_marker(mut self, marker: impl Into<String>) -> Self {
        self.json_path_markers.push(marker.into());
        self
    }

    /// Replace the JSON path markers
    pub fn json_path_markers(mut self, markers: Vec<String>) -> Self {
        self.json_path_markers = markers;
        self
    }

    /// Set the urlencoded array format
    pub fn array_format(mut self, format: ArrayFormat) -> Self {
        self.array_format = format;
        self
    }

    /// Resolve a request target against the base URL
    pub fn resolve_url(&self, target: &str) -> Result<Url> {
        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match self.base_url {
                Some(ref base) => Ok(base.join(target)?),
                None => Err(Error::config(format!(
                    "Relative URL '{}' needs a base URL",
                    target
                ))),
            },
            Err(e) => Err(e.into()),
        }
    }
}

/// Shared HTTP client with interceptors
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: Arc<HttpClientConfig>,
    chain: Arc<InterceptorChain>,
    session_events: Option<broadcast::Sender<SessionExpired>>,
}

impl HttpClient {
    /// Create a client with panel defaults and the standard interceptors
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a client with custom configuration and the standard interceptors
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Start building a client
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Registered interceptors, in execution order
    pub fn interceptors(&self) -> &InterceptorChain {
        &self.chain
    }

    /// Subscribe to session-expired events
    pub fn session_events(&self) -> Option<broadcast::Receiver<SessionExpired>> {
        self.session_events.as_ref().map(|tx| tx.subscribe())
    }

    /// Create a request builder
    ///
    /// Construction errors (bad target, bad header) are held until
    /// [`RequestBuilder::send`] and flow through the interceptor chain.
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder {
        let url = url.into();
        let request = self
            .config
            .resolve_url(&url)
            .map(|_| Request::new(method, url));
        RequestBuilder {
            client: self.clone(),
            request,
        }
    }

    /// Build a GET request
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// Build a POST request
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// POST a urlencoded form
    pub async fn post_form<T: Serialize>(
        &self,
        url: impl Into<String>,
        data: &T,
    ) -> Result<Response> {
        self.post(url).form(data).send().await
    }

    /// POST a JSON body
    pub async fn post_json<T: Serialize>(
        &self,
        url: impl Into<String>,
        data: &T,
    ) -> Result<Response> {
        self.post(url).json(data).send().await
    }

    /// POST a multipart form
    pub async fn post_multipart(
        &self,
        url: impl Into<String>,
        form: FormData,
    ) -> Result<Response> {
        self.post(url).multipart(form).send().await
    }

    /// Execute a request
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.execute(Ok(request)).await
    }

    /// Execute multiple requests concurrently
    pub async fn send_all(&self, requests: Vec<Request>) -> Vec<Result<Response>> {
        let futures: Vec<_> = requests.into_iter().map(|r| self.send(r)).collect();
        futures::future::join_all(futures).await
    }

    /// Run an outcome through defaults, the chain and the transport
    pub async fn execute(&self, request: Result<Request>) -> Result<Response> {
        let request = request.map(|mut request| {
            self.config.defaults.apply(&mut request);
            request
        });

        let outcome = match self.chain.process_request(request).await {
            Ok(request) => self.dispatch(request).await,
            Err(error) => Err(error),
        };

        self.chain.process_response(outcome).await
    }

    async fn dispatch(&self, request: Request) -> Result<Response> {
        let start = Instant::now();
        let url = self.config.resolve_url(&request.url)?;
        let Request {
            method,
            mut headers,
            body,
            timeout,
            ..
        } = request;

        tracing::debug!(method = %method, url = %url, "Dispatching request");

        let labelled_json = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with(JSON))
            .unwrap_or(false);

        let builder = self.client.request(method, url.clone());
        let mut builder = match body {
            Body::Multipart(form) => {
                // The transport writes the header again, with the boundary
                headers.remove(CONTENT_TYPE);
                builder.headers(headers).multipart(form.into_multipart()?)
            }
            Body::Json(value) if value.is_object() || value.is_array() || labelled_json => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
                }
                builder.headers(headers).body(serde_json::to_vec(&value)?)
            }
            // Primitives go out as plain text under whatever label they carry
            Body::Json(Value::String(text)) => builder.headers(headers).body(text),
            Body::Json(value) if !value.is_null() => {
                builder.headers(headers).body(value.to_string())
            }
            Body::Text(text) => builder.headers(headers).body(text),
            Body::Bytes(bytes) => builder.headers(headers).body(bytes),
            Body::Json(_) | Body::Empty => builder.headers(headers),
        };

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = Response::read(builder.send().await?, &url, start).await?;

        tracing::debug!(
            url = %response.url,
            status = %response.status,
            time_ms = response.response_time_ms,
            "Response received"
        );

        response.into_result()
    }
}

/// Builder for [`HttpClient`]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    interceptors: Vec<Arc<dyn Interceptor>>,
    session_guard: Option<SessionGuard>,
    listeners: Vec<SessionCallback>,
    standard: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            config: HttpClientConfig::default(),
            interceptors: Vec::new(),
            session_guard: None,
            listeners: Vec::new(),
            standard: true,
        }
    }
}

impl HttpClientBuilder {
    /// Set the configuration
    pub fn config(mut self, config: HttpClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an extra interceptor
    pub fn interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Use a prepared session guard
    pub fn session_guard(mut self, guard: SessionGuard) -> Self {
        self.session_guard = Some(guard);
        self
    }

    /// Run a callback whenever the session expires
    pub fn on_session_expired<F>(mut self, callback: F) -> Self
    where
        F: Fn(&SessionExpired) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(callback));
        self
    }

    /// Skip the content negotiator and the session guard
    ///
    /// A guard or listeners registered explicitly are still installed.
    pub fn without_standard_interceptors(mut self) -> Self {
        self.standard = false;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<HttpClient> {
        let config = self.config;

        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .cookie_store(config.cookie_store);

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build()?;

        let mut chain = InterceptorChain::new();
        if self.standard {
            chain.add(ContentNegotiator::new(
                config.json_path_markers.clone(),
                config.array_format,
            ));
        }

        let guard = match self.session_guard {
            Some(guard) => Some(guard),
            None if self.standard || !self.listeners.is_empty() => Some(SessionGuard::new()),
            None => None,
        }
        .map(|guard| {
            self.listeners
                .into_iter()
                .fold(guard, |guard, listener| guard.listener(listener))
        });

        let session_events = guard.as_ref().map(SessionGuard::sender);
        if let Some(guard) = guard {
            chain.add(guard);
        }

        for interceptor in self.interceptors {
            chain.add_arc(interceptor);
        }

        tracing::debug!(interceptors = ?chain.names(), "HTTP client ready");

        Ok(HttpClient {
            client,
            config: Arc::new(config),
            chain: Arc::new(chain),
            session_events,
        })
    }
}

/// Builder for executing requests with the client
pub struct RequestBuilder {
    client: HttpClient,
    request: Result<Request>,
}

impl RequestBuilder {
    /// Set a header
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.request = self.request.and_then(|r| r.header(name, value));
        self
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.request = self.request.map(|r| r.body(body));
        self
    }

    /// Set a structured body and let negotiation pick the encoding
    pub fn data<T: Serialize>(mut self, data: &T) -> Self {
        self.request = self.request.and_then(|r| r.data(data));
        self
    }

    /// Set a structured body sent as JSON
    pub fn json<T: Serialize>(self, data: &T) -> Self {
        self.data(data).encoding(Encoding::Json)
    }

    /// Set a structured body sent urlencoded
    pub fn form<T: Serialize>(self, data: &T) -> Self {
        self.data(data).encoding(Encoding::FormUrlEncoded)
    }

    /// Set a multipart body
    pub fn multipart(mut self, form: FormData) -> Self {
        self.request = self.request.map(|r| r.multipart(form));
        self
    }

    /// Force an encoding
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.request = self.request.map(|r| r.encoding(encoding));
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request = self.request.map(|r| r.timeout(timeout));
        self
    }

    /// Request as built so far
    pub fn build(self) -> Result<Request> {
        self.request
    }

    /// Execute the request
    pub async fn send(self) -> Result<Response> {
        self.client.execute(self.request).await
    }
}
