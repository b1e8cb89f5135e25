//! HTTP layer
//!
//! This module sends signed requests and classifies the raw responses.
//! Exactly one attempt is made per call.

pub use invoker::{HttpInvoker, ReqwestInvoker, ReqwestInvokerBuilder};
pub use response::HttpResponse;
pub use status::{check_status, permission_denied_marker};

mod invoker;
mod response;
mod status;

// Re-export HTTP types from the http crate for convenience
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
