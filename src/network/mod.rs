// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request/response interception
//!
//! Hooks every exchange made through the shared client: content-type
//! negotiation on the way out, session-expiry detection on the way back.

mod content_type;
mod event;
mod interceptor_trait;
mod session;

pub use content_type::ContentNegotiator;
pub use event::SessionExpired;
pub use interceptor_trait::{Interceptor, InterceptorChain, RequestLogger};
pub use session::{SessionCallback, SessionGuard};
