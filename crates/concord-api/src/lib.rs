//! concord-api
//!
//! Blocking HTTP client for the reconciliation platform API. Every network
//! call flows through `RateLimitedTransport`, the single choke point for
//! throttle compliance and bounded retry; `PlatformClient` layers typed
//! endpoint wrappers on top of it.

pub mod client;
pub mod error;
pub mod retry;
pub mod transport;
pub mod types;

pub use crate::client::PlatformClient;
pub use crate::error::ApiError;
pub use crate::retry::RetryPolicy;
pub use crate::transport::RateLimitedTransport;
pub use crate::types::{Principal, ScopeMembership};
