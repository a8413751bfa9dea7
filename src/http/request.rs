// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request descriptor

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::body::{Body, FormData};
use crate::error::{Error, Result};

/// Explicit body encoding for a single call
///
/// Calls that leave this unset get the encoding inferred from the payload
/// shape and the target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    FormUrlEncoded,
    Json,
    Multipart,
}

/// HTTP request representation
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Target as given by the caller, absolute or relative to the base URL
    pub url: String,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: Body,
    /// Explicit encoding override
    pub encoding: Option<Encoding>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a new request with arbitrary method
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Body::Empty,
            encoding: None,
            timeout: None,
        }
    }

    /// Create a new GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a new POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Set a header, rejecting invalid names or values
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        self.set_header(name.as_ref(), value.as_ref())?;
        Ok(self)
    }

    /// Set a header in place
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let header_name =
            HeaderName::try_from(name).map_err(|e| Error::invalid_header(name, e))?;
        let header_value =
            HeaderValue::try_from(value).map_err(|e| Error::invalid_header(name, e))?;
        self.headers.insert(header_name, header_value);
        Ok(())
    }

    /// Set the body
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a structured body, encoded on send by negotiation
    pub fn data<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.body = Body::Json(serde_json::to_value(data)?);
        Ok(self)
    }

    /// Set a multipart body
    pub fn multipart(mut self, form: FormData) -> Self {
        self.body = Body::Multipart(form);
        self
    }

    /// Set raw bytes
    pub fn bytes(mut self, data: impl Into<Bytes>) -> Self {
        self.body = Body::Bytes(data.into());
        self
    }

    /// Force an encoding instead of inferring one
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Current `Content-Type`, if set and readable
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Replace `Content-Type` with a static value
    pub fn set_content_type(&mut self, value: &'static str) {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(value));
    }

    /// Check if the target contains the given path fragment
    pub fn targets(&self, fragment: &str) -> bool {
        self.url.contains(fragment)
    }

    /// Structured body value, if any
    pub fn structured_body(&self) -> Option<&Value> {
        self.body.as_structured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_creation() {
        let req = Request::get("/panel/api/inbounds/list");
        assert_eq!(req.method, Method::GET);
        assert!(req.targets("/panel/api/"));
        assert!(req.body.is_empty());
        assert!(req.encoding.is_none());
    }

    #[test]
    fn test_request_headers_case_insensitive() {
        let req = Request::post("/login")
            .header("Content-Type", "application/json")
            .unwrap();
        assert_eq!(req.content_type(), Some("application/json"));
        assert!(req.headers.contains_key("content-type"));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let err = Request::get("/").header("bad header", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { .. }));

        let err = Request::get("/").header("x-ok", "line\nbreak").unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { .. }));
    }

    #[test]
    fn test_structured_body() {
        #[derive(Serialize)]
        struct Login<'a> {
            username: &'a str,
            password: &'a str,
        }

        let req = Request::post("/login")
            .data(&Login {
                username: "admin",
                password: "admin",
            })
            .unwrap();
        assert_eq!(
            req.structured_body(),
            Some(&json!({"username": "admin", "password": "admin"}))
        );
    }
}
