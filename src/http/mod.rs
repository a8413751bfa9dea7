// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client layer for the panel
//!
//! Provides the shared client, its immutable default headers, request and
//! response descriptors, and the payload encoders the interceptors rely on.

mod body;
mod client;
mod defaults;
pub mod qs;
mod request;
mod response;

pub use body::{Body, FormData, FormPart, PartValue};
pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig, RequestBuilder};
pub use defaults::DefaultHeaders;
pub use qs::ArrayFormat;
pub use request::{Encoding, Request};
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("panel-client/", env!("CARGO_PKG_VERSION"));

/// Path segment that marks endpoints expecting JSON bodies
pub const PANEL_API_MARKER: &str = "/panel/api/";

/// Common HTTP headers
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const USER_AGENT: &str = "user-agent";
    pub const X_REQUESTED_WITH: &str = "x-requested-with";
}

/// Content type values the client negotiates between
pub mod content_types {
    pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded; charset=UTF-8";
    pub const JSON: &str = "application/json";
    pub const MULTIPART: &str = "multipart/form-data";
    pub const XML_HTTP_REQUEST: &str = "XMLHttpRequest";
}
