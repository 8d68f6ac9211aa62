//! concord-core
//!
//! Shared data model for the concord reconciliation engine: desired and
//! remote resource types, desired-set loading and validation, and secret
//! redaction for evidence output. No network code lives here.

pub mod desired;
pub mod error;
pub mod redact;
pub mod resource;

pub use crate::desired::{load_desired, parse_desired};
pub use crate::error::CoreError;
pub use crate::redact::{fingerprint, redact_json};
pub use crate::resource::{DesiredResource, RemoteResource, ResourceOption, validate_desired};
