//! Credential verification against the identity endpoint.

use concord_api::{PlatformClient, Principal};

use crate::error::EngineError;

/// Scheme prefixes that must not be embedded in a raw credential; the
/// transport adds its own scheme.
const SCHEME_PREFIXES: [&str; 3] = ["bearer ", "bot ", "token "];

/// Reject malformed credentials before any network call.
pub fn validate_credential(credential: &str) -> Result<(), EngineError> {
    if credential.trim().is_empty() {
        return Err(EngineError::Validation("credential is empty".into()));
    }
    let lower = credential.to_ascii_lowercase();
    if SCHEME_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return Err(EngineError::Validation(
            "credential carries an embedded scheme prefix".into(),
        ));
    }
    if credential.chars().any(char::is_whitespace) {
        return Err(EngineError::Validation(
            "credential contains whitespace".into(),
        ));
    }
    Ok(())
}

/// `GET /identity`. 401/403 are terminal auth failures, never retried.
pub fn verify(client: &PlatformClient, credential: &str) -> Result<Principal, EngineError> {
    validate_credential(credential)?;
    match client.identity() {
        Ok(principal) => {
            tracing::info!(principal = %principal.id, "credential verified");
            Ok(principal)
        }
        Err(err) if err.is_auth() => Err(EngineError::Auth(err.to_string())),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credential_rejected() {
        assert!(validate_credential("").is_err());
        assert!(validate_credential("   ").is_err());
    }

    #[test]
    fn scheme_prefix_rejected() {
        assert!(validate_credential("Bearer abc123").is_err());
        assert!(validate_credential("bot abc123").is_err());
        assert!(validate_credential("Token abc123").is_err());
    }

    #[test]
    fn embedded_whitespace_rejected() {
        assert!(validate_credential("abc 123").is_err());
    }

    #[test]
    fn plain_credential_accepted() {
        assert!(validate_credential("abcdef123456").is_ok());
    }
}
