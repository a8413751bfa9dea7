// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Default headers, scoped per client instance

use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;

use super::content_types::{FORM_URLENCODED, XML_HTTP_REQUEST};
use super::headers::X_REQUESTED_WITH;
use super::request::Request;
use crate::error::{Error, Result};

/// Default headers at two scopes: all methods and per method
///
/// Precedence, lowest first: `common`, the method scope, then whatever
/// the request already carries.
#[derive(Debug, Clone, Default)]
pub struct DefaultHeaders {
    common: HeaderMap,
    per_method: HashMap<Method, HeaderMap>,
}

impl DefaultHeaders {
    /// No defaults at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Panel defaults: `X-Requested-With` everywhere, form content type for POST
    pub fn panel() -> Self {
        let mut defaults = Self::empty();
        defaults.common.insert(
            HeaderName::from_static(X_REQUESTED_WITH),
            HeaderValue::from_static(XML_HTTP_REQUEST),
        );
        defaults
            .per_method
            .entry(Method::POST)
            .or_default()
            .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_URLENCODED));
        defaults
    }

    /// Add a header for every method
    pub fn common(mut self, name: &str, value: &str) -> Result<Self> {
        let (name, value) = parse(name, value)?;
        self.common.insert(name, value);
        Ok(self)
    }

    /// Add a header for one method
    pub fn method(mut self, method: Method, name: &str, value: &str) -> Result<Self> {
        let (name, value) = parse(name, value)?;
        self.per_method.entry(method).or_default().insert(name, value);
        Ok(self)
    }

    /// Headers that apply to `method`, before request overrides
    pub fn resolve(&self, method: &Method) -> HeaderMap {
        let mut merged = self.common.clone();
        if let Some(scoped) = self.per_method.get(method) {
            for (name, value) in scoped {
                merged.insert(name.clone(), value.clone());
            }
        }
        merged
    }

    /// Fill in defaults the request does not set itself
    pub fn apply(&self, request: &mut Request) {
        for (name, value) in self.resolve(&request.method) {
            if let Some(name) = name {
                if !request.headers.contains_key(&name) {
                    request.headers.insert(name, value);
                }
            }
        }
    }
}

fn parse(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::try_from(name).map_err(|e| Error::invalid_header(name, e))?;
    let header_value = HeaderValue::try_from(value).map_err(|e| Error::invalid_header(name, e))?;
    Ok((header_name, header_value))
}
