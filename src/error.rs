// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the panel client
//!
//! Failures fall into two families: transport failures that never produced
//! a server response (timeouts, DNS, refused connections) and status
//! failures that carry the non-2xx [`Response`] the server sent back.

use thiserror::Error;

use crate::http::Response;

/// Result type alias for panel client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the panel client
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure, no server response available
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing or resolution failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Header name or value could not be used
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Body could not be encoded as requested
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Server answered with a non-2xx status
    #[error("Request to {url} failed with status {status}")]
    Status {
        status: u16,
        url: String,
        response: Box<Response>,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a status error from a server response
    pub fn status(response: Response) -> Self {
        Error::Status {
            status: response.status_code(),
            url: response.url_str().to_string(),
            response: Box::new(response),
        }
    }

    /// Create an invalid header error
    pub fn invalid_header(name: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidHeader {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Error::Encoding(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Server response attached to this failure, if any
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Status { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Check if the failure carries a server response
    pub fn has_response(&self) -> bool {
        self.response().is_some()
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this is a transport-level failure
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http(_))
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Http(e) if e.is_timeout())
    }

    /// Check if the server rejected the session (401)
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Status { url, .. } => Some(url),
            Error::Http(e) => e.url().map(|u| u.as_str()),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
