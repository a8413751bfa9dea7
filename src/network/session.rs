// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session-expiry handling on the response side
//!
//! A `401 Unauthorized` anywhere means the panel session is gone. Instead of
//! surfacing it to the caller, the guard notifies the host application,
//! which typically sends the user back through login.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::broadcast;

use super::event::SessionExpired;
use super::interceptor_trait::Interceptor;
use crate::error::{Error, Result};
use crate::http::Response;

/// Session-expired callback type
pub type SessionCallback = Arc<dyn Fn(&SessionExpired) + Send + Sync>;

const EVENT_CAPACITY: usize = 16;

/// Response interceptor turning the guarded status into a session event
#[derive(Clone)]
pub struct SessionGuard {
    status: StatusCode,
    listeners: Vec<SessionCallback>,
    events: broadcast::Sender<SessionExpired>,
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGuard {
    /// Create a guard for `401 Unauthorized`
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            status: StatusCode::UNAUTHORIZED,
            listeners: Vec::new(),
            events,
        }
    }

    /// Guard a different status
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Register a callback run once per expired-session outcome
    pub fn on_expired<F>(self, callback: F) -> Self
    where
        F: Fn(&SessionExpired) + Send + Sync + 'static,
    {
        self.listener(Arc::new(callback))
    }

    /// Register a shared callback
    pub fn listener(mut self, callback: SessionCallback) -> Self {
        self.listeners.push(callback);
        self
    }

    /// Subscribe to session events asynchronously
    pub fn subscribe(&self) -> broadcast::Receiver<SessionExpired> {
        self.events.subscribe()
    }

    pub(crate) fn sender(&self) -> broadcast::Sender<SessionExpired> {
        self.events.clone()
    }

    fn notify(&self, event: &SessionExpired) {
        for listener in &self.listeners {
            listener(event);
        }
        // No subscribers is not an error
        let _ = self.events.send(event.clone());
    }
}

#[async_trait]
impl Interceptor for SessionGuard {
    async fn on_response_error(&self, error: Error) -> Result<Response> {
        match error {
            Error::Status { response, .. } if response.status == self.status => {
                let event = SessionExpired::from_response(&response);
                tracing::warn!(url = %event.url, status = event.status, "Session expired");
                self.notify(&event);
                Ok(*response)
            }
            other => Err(other),
        }
    }

    fn name(&self) -> &'static str {
        "session-guard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use bytes::Bytes;
    use reqwest::header::HeaderMap;
    use url::Url;

    fn failure(status: StatusCode) -> Error {
        Error::status(Response::new(
            status,
            HeaderMap::new(),
            Bytes::from_static(b"denied"),
            Url::parse("https://panel.example/panel/api/inbounds/list").unwrap(),
            false,
            3,
        ))
    }

    fn counting_guard() -> (SessionGuard, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let guard = SessionGuard::new().on_expired(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (guard, calls)
    }

    #[tokio::test]
    async fn test_unauthorized_notifies_once() {
        let (guard, calls) = counting_guard();
        let mut events = guard.subscribe();

        let response = guard
            .on_response_error(failure(StatusCode::UNAUTHORIZED))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.status_code(), 401);

        let event = events.try_recv().unwrap();
        assert_eq!(event.status, 401);
        assert_eq!(event.url, "https://panel.example/panel/api/inbounds/list");
    }

    #[tokio::test]
    async fn test_each_outcome_notifies() {
        let (guard, calls) = counting_guard();

        for _ in 0..3 {
            assert!(guard
                .on_response_error(failure(StatusCode::UNAUTHORIZED))
                .await
                .is_ok());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_forbidden_rejected_unchanged() {
        let (guard, calls) = counting_guard();

        let err = guard
            .on_response_error(failure(StatusCode::FORBIDDEN))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.response().unwrap().text().unwrap(), "denied");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_response_rejected_unchanged() {
        let (guard, calls) = counting_guard();

        let err = guard
            .on_response_error(Error::other("dns failure"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "dns failure");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let (guard, calls) = counting_guard();
        let response = Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::new(),
            Url::parse("https://panel.example/").unwrap(),
            false,
            1,
        );

        let response = guard.on_response(response).await.unwrap();
        assert_eq!(response.status_code(), 200);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_custom_status() {
        let (guard, calls) = counting_guard();
        let guard = guard.status(StatusCode::FORBIDDEN);

        assert!(guard
            .on_response_error(failure(StatusCode::FORBIDDEN))
            .await
            .is_ok());
        assert!(guard
            .on_response_error(failure(StatusCode::UNAUTHORIZED))
            .await
            .is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
