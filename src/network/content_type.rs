// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Outgoing content-type negotiation
//!
//! Picks the wire encoding of a request body from its shape and target:
//!
//! 1. multipart forms are tagged `multipart/form-data` and left alone
//! 2. a request already marked `application/json` is left alone
//! 3. structured bodies go out as JSON to panel API paths and as a
//!    urlencoded string (repeated keys for arrays) everywhere else
//! 4. anything else passes through untouched
//!
//! An explicit [`Encoding`] on the request takes precedence over all of
//! the above.

use async_trait::async_trait;

use super::interceptor_trait::Interceptor;
use crate::error::{Error, Result};
use crate::http::content_types::{FORM_URLENCODED, JSON, MULTIPART};
use crate::http::qs::{self, ArrayFormat};
use crate::http::{Body, Encoding, FormData, Request, PANEL_API_MARKER};

/// Request interceptor choosing the body encoding
#[derive(Debug, Clone)]
pub struct ContentNegotiator {
    json_markers: Vec<String>,
    array_format: ArrayFormat,
}

impl Default for ContentNegotiator {
    fn default() -> Self {
        Self::new(vec![PANEL_API_MARKER.to_string()], ArrayFormat::Repeat)
    }
}

impl ContentNegotiator {
    /// Create a negotiator with the given JSON path markers
    pub fn new(json_markers: Vec<String>, array_format: ArrayFormat) -> Self {
        Self {
            json_markers,
            array_format,
        }
    }

    /// Check if the target is an endpoint expecting JSON
    pub fn wants_json(&self, request: &Request) -> bool {
        self.json_markers
            .iter()
            .any(|marker| request.targets(marker))
    }

    /// Apply the negotiation rules to a request
    pub fn negotiate(&self, request: &mut Request) -> Result<()> {
        if let Some(encoding) = request.encoding {
            return self.apply_explicit(request, encoding);
        }

        if request.body.is_multipart() {
            request.set_content_type(MULTIPART);
            return Ok(());
        }

        // Only an exact match counts; any other preset type is treated as unset
        if request.content_type() == Some(JSON) {
            return Ok(());
        }

        if !request.body.is_structured() {
            return Ok(());
        }

        if self.wants_json(request) {
            request.set_content_type(JSON);
        } else if let Some(encoded) = self.form_string(&request.body) {
            request.body = Body::Text(encoded);
        }

        Ok(())
    }

    fn apply_explicit(&self, request: &mut Request, encoding: Encoding) -> Result<()> {
        match encoding {
            Encoding::Json => request.set_content_type(JSON),
            Encoding::FormUrlEncoded => {
                if let Some(encoded) = self.form_string(&request.body) {
                    request.body = Body::Text(encoded);
                }
                request.set_content_type(FORM_URLENCODED);
            }
            Encoding::Multipart => {
                let form = match std::mem::take(&mut request.body) {
                    Body::Multipart(form) => form,
                    Body::Json(value) if value.is_object() || value.is_array() => {
                        FormData::from_pairs(qs::pairs(&value, self.array_format))
                    }
                    other => {
                        request.body = other;
                        return Err(Error::encoding(
                            "multipart encoding needs a form or a structured body",
                        ));
                    }
                };
                request.body = Body::Multipart(form);
                request.set_content_type(MULTIPART);
            }
        }
        Ok(())
    }

    fn form_string(&self, body: &Body) -> Option<String> {
        body.as_structured()
            .map(|value| qs::stringify(value, self.array_format))
    }
}

#[async_trait]
impl Interceptor for ContentNegotiator {
    async fn on_request(&self, request: &mut Request) -> Result<()> {
        self.negotiate(request)
    }

    fn name(&self) -> &'static str {
        "content-negotiator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::DefaultHeaders;
    use crate::network::InterceptorChain;
    use reqwest::header::CONTENT_TYPE;
    use serde_json::json;

    fn negotiated(mut request: Request) -> Request {
        DefaultHeaders::panel().apply(&mut request);
        ContentNegotiator::default().negotiate(&mut request).unwrap();
        request
    }

    #[test]
    fn test_multipart_body() {
        let form = FormData::new().text("remark", "node-1");
        let request = negotiated(Request::post("/panel/api/inbounds/import").multipart(form));

        assert_eq!(request.content_type(), Some("multipart/form-data"));
        match &request.body {
            Body::Multipart(form) => assert_eq!(form.len(), 1),
            other => panic!("Expected multipart body, got {:?}", other),
        }
    }

    #[test]
    fn test_explicit_json_header_untouched() {
        let mut request = Request::post("/server/update")
            .header("Content-Type", "application/json")
            .unwrap()
            .data(&json!({"a": [1, 2]}))
            .unwrap();
        DefaultHeaders::panel().apply(&mut request);
        let before = request.headers.clone();

        ContentNegotiator::default().negotiate(&mut request).unwrap();

        assert_eq!(request.headers, before);
        assert_eq!(request.structured_body(), Some(&json!({"a": [1, 2]})));
    }

    #[test]
    fn test_panel_api_object_goes_json() {
        let request = negotiated(
            Request::post("/panel/api/users")
                .data(&json!({"name": "alice", "ids": [1, 2]}))
                .unwrap(),
        );

        assert_eq!(request.content_type(), Some("application/json"));
        assert_eq!(
            request.structured_body(),
            Some(&json!({"name": "alice", "ids": [1, 2]}))
        );
    }

    #[test]
    fn test_other_object_goes_form() {
        let request = negotiated(
            Request::post("/other/endpoint")
                .data(&json!({"a": 1, "b": [2, 3]}))
                .unwrap(),
        );

        assert_eq!(request.body.as_text(), Some("a=1&b=2&b=3"));
        assert_eq!(request.content_type(), Some(FORM_URLENCODED));
    }

    #[test]
    fn test_other_content_type_treated_as_unset() {
        let request = negotiated(
            Request::post("/other/endpoint")
                .header("content-type", "text/plain")
                .unwrap()
                .data(&json!({"a": 1}))
                .unwrap(),
        );

        assert_eq!(request.body.as_text(), Some("a=1"));
        assert_eq!(request.content_type(), Some("text/plain"));
    }

    #[test]
    fn test_non_structured_bodies_pass_through() {
        let bodies = vec![
            Body::Empty,
            Body::Json(serde_json::Value::Null),
            Body::Json(json!("plain")),
            Body::Json(json!(42)),
            Body::Text("already=encoded".to_string()),
        ];

        for body in bodies {
            let mut request = Request::post("/panel/api/x").body(body.clone());
            DefaultHeaders::panel().apply(&mut request);
            let before = request.headers.clone();

            ContentNegotiator::default().negotiate(&mut request).unwrap();

            assert_eq!(request.headers, before);
            assert_eq!(format!("{:?}", request.body), format!("{:?}", body));
        }
    }

    #[test]
    fn test_explicit_encoding_overrides_path() {
        let request = negotiated(
            Request::post("/panel/api/settings")
                .data(&json!({"a": 1}))
                .unwrap()
                .encoding(Encoding::FormUrlEncoded),
        );
        assert_eq!(request.body.as_text(), Some("a=1"));
        assert_eq!(request.content_type(), Some(FORM_URLENCODED));

        let request = negotiated(
            Request::post("/login")
                .data(&json!({"a": 1}))
                .unwrap()
                .encoding(Encoding::Json),
        );
        assert_eq!(request.content_type(), Some(JSON));
        assert_eq!(request.structured_body(), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_explicit_multipart_from_object() {
        let request = negotiated(
            Request::post("/upload")
                .data(&json!({"remark": "x", "tags": ["a", "b"]}))
                .unwrap()
                .encoding(Encoding::Multipart),
        );

        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), MULTIPART);
        match &request.body {
            Body::Multipart(form) => {
                let names: Vec<_> = form.parts().iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["remark", "tags", "tags"]);
            }
            other => panic!("Expected multipart body, got {:?}", other),
        }
    }

    #[test]
    fn test_explicit_multipart_rejects_text() {
        let mut request = Request::post("/upload")
            .body("raw")
            .encoding(Encoding::Multipart);

        let err = ContentNegotiator::default()
            .negotiate(&mut request)
            .unwrap_err();

        assert!(matches!(err, Error::Encoding(_)));
        assert_eq!(request.body.as_text(), Some("raw"));
    }

    #[test]
    fn test_custom_markers() {
        let negotiator =
            ContentNegotiator::new(vec!["/api/v2/".to_string()], ArrayFormat::Brackets);

        let mut request = Request::post("/api/v2/items").data(&json!({"a": 1})).unwrap();
        negotiator.negotiate(&mut request).unwrap();
        assert_eq!(request.content_type(), Some(JSON));

        let mut request = Request::post("/panel/api/items").data(&json!({"b": [1]})).unwrap();
        negotiator.negotiate(&mut request).unwrap();
        assert_eq!(request.body.as_text(), Some("b%5B%5D=1"));
    }

    #[tokio::test]
    async fn test_upstream_error_rejected_unchanged() {
        let mut chain = InterceptorChain::new();
        chain.add(ContentNegotiator::default());

        let err = chain
            .process_request(Err(Error::config("Relative URL without base")))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Config(ref msg) if msg == "Relative URL without base"));
    }
}
