// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session events emitted by the response chain

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::Response;

/// The server rejected the caller's session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExpired {
    /// URL of the rejected request (after redirects)
    pub url: String,
    /// Status that triggered the event
    pub status: u16,
    /// When the rejection was observed
    pub timestamp: DateTime<Utc>,
}

impl SessionExpired {
    /// Build an event from the rejecting response
    pub fn from_response(response: &Response) -> Self {
        Self {
            url: response.url_str().to_string(),
            status: response.status_code(),
            timestamp: Utc::now(),
        }
    }
}
