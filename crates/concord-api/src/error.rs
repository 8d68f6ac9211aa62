use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limit retries exhausted after {attempts} attempts: {method} {url}")]
    RateLimitExhausted {
        method: String,
        url: String,
        attempts: u32,
    },

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    #[error("network failure after {attempts} attempts: {method} {url}: {message}")]
    Network {
        method: String,
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("invalid response body from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ApiError {
    /// True for 401/403: the credential was rejected, which is structural,
    /// not transient.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
