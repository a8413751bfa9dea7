// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # panel-client - Shared HTTP client for the panel API
//!
//! One client instance per application, configured once:
//!
//! - Default headers: `X-Requested-With: XMLHttpRequest` on every request,
//!   form-urlencoded `Content-Type` on POST
//! - Content negotiation: multipart forms stay multipart, `/panel/api/`
//!   endpoints get JSON, everything else gets a urlencoded form with
//!   repeated keys for arrays
//! - Session expiry: a `401` never reaches the caller as an error; it is
//!   reported as a [`SessionExpired`] event instead
//!
//! ## Example
//!
//! ```rust,no_run
//! use panel_client::{HttpClient, HttpClientConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::builder()
//!         .config(HttpClientConfig::new().base_url("https://panel.example/")?)
//!         .on_session_expired(|event| eprintln!("Session expired at {}", event.url))
//!         .build()?;
//!
//!     // Sent as application/json
//!     client
//!         .post("/panel/api/inbounds/add")
//!         .data(&json!({"remark": "node-1", "port": 443}))
//!         .send()
//!         .await?;
//!
//!     // Sent as username=admin&password=admin
//!     client
//!         .post("/login")
//!         .data(&json!({"username": "admin", "password": "admin"}))
//!         .send()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;
pub mod network;

// Errors
pub use error::{Error, Result};

// HTTP
pub use http::{
    ArrayFormat, Body, DefaultHeaders, Encoding, FormData, HttpClient, HttpClientBuilder,
    HttpClientConfig, Request, RequestBuilder, Response,
};

// Network
pub use network::{
    ContentNegotiator, Interceptor, InterceptorChain, RequestLogger, SessionCallback,
    SessionExpired, SessionGuard,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
