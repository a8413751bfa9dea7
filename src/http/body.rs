// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request payload shapes

use std::path::Path;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::error::Result;

/// Request body
///
/// The interceptors branch on the shape of the payload, so the body keeps
/// its structure until the client serializes it on send.
#[derive(Debug, Clone, Default)]
pub enum Body {
    /// No payload
    #[default]
    Empty,
    /// Multipart form, boundary written by the transport
    Multipart(FormData),
    /// JSON value, serialized on send
    Json(Value),
    /// Already-serialized text
    Text(String),
    /// Raw bytes
    Bytes(Bytes),
}

impl Body {
    /// Check for a multipart form payload
    pub fn is_multipart(&self) -> bool {
        matches!(self, Body::Multipart(_))
    }

    /// Check for a key/value payload (JSON object or array)
    pub fn is_structured(&self) -> bool {
        matches!(self, Body::Json(Value::Object(_) | Value::Array(_)))
    }

    /// Check for an absent or null payload
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty | Body::Json(Value::Null))
    }

    /// Structured value, if this is one
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Body::Json(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
            _ => None,
        }
    }

    /// Text content, if this is already serialized
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<FormData> for Body {
    fn from(form: FormData) -> Self {
        Body::Multipart(form)
    }
}

/// Multipart form payload
#[derive(Debug, Clone, Default)]
pub struct FormData {
    parts: Vec<FormPart>,
}

/// One named field of a multipart form
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

/// Field content
#[derive(Debug, Clone, PartialEq)]
pub enum PartValue {
    /// Plain text field
    Text(String),
    /// File upload
    File {
        filename: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    },
}

impl FormData {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a form of text fields from ordered pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |form, (name, value)| form.text(name, value))
    }

    /// Add a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::Text(value.into()),
        });
        self
    }

    /// Add an in-memory file
    pub fn bytes(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::File {
                filename: Some(filename.into()),
                content_type: None,
                data: data.into(),
            },
        });
        self
    }

    /// Add a file read from disk
    pub async fn file(mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        self.parts.push(FormPart {
            name: name.into(),
            value: PartValue::File {
                filename: path.file_name().map(|n| n.to_string_lossy().into_owned()),
                content_type: None,
                data: Bytes::from(data),
            },
        });
        Ok(self)
    }

    /// Set the MIME type of the most recently added file
    pub fn mime(mut self, content_type: impl Into<String>) -> Self {
        if let Some(FormPart {
            value: PartValue::File {
                content_type: slot, ..
            },
            ..
        }) = self.parts.last_mut()
        {
            *slot = Some(content_type.into());
        }
        self
    }

    /// All parts in insertion order
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if the form has no parts
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Convert into a transport form
    pub(crate) fn into_multipart(self) -> Result<Form> {
        let mut form = Form::new();
        for FormPart { name, value } in self.parts {
            form = match value {
                PartValue::Text(text) => form.text(name, text),
                PartValue::File {
                    filename,
                    content_type,
                    data,
                } => {
                    let mut part = Part::bytes(data.to_vec());
                    if let Some(filename) = filename {
                        part = part.file_name(filename);
                    }
                    if let Some(content_type) = content_type {
                        part = part.mime_str(&content_type)?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}
