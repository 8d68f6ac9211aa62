use thiserror::Error;

use concord_api::ApiError;
use concord_core::CoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("membership check failed: {0}")]
    Membership(String),

    #[error("principal is not a member of scope {scope}; authorize at {remediation}")]
    MembershipDenied { scope: String, remediation: String },

    #[error("wall-clock budget of {budget_secs}s exceeded")]
    Budget { budget_secs: u64 },

    #[error("platform error: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
