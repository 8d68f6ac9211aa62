//! Scope membership check with a concrete remediation path.

use concord_api::PlatformClient;

use crate::error::EngineError;

/// Outcome of the membership check.
///
/// A negative result is not an error: the caller gets the authorization
/// URL to fix it rather than a bare boolean.
#[derive(Debug, Clone)]
pub struct MembershipResult {
    pub member: bool,
    pub scope_name: Option<String>,
    pub remediation: Option<String>,
}

/// Confirm the principal can reach `scope_id` before any mutation is
/// attempted. A failure of the check itself (as opposed to a negative
/// result) is fatal and never retried.
pub fn verify(client: &PlatformClient, scope_id: &str) -> Result<MembershipResult, EngineError> {
    let scopes = client
        .scopes()
        .map_err(|e| EngineError::Membership(e.to_string()))?;

    match scopes.into_iter().find(|s| s.id == scope_id) {
        Some(scope) => {
            tracing::info!(scope = %scope_id, name = %scope.name, "scope membership confirmed");
            Ok(MembershipResult {
                member: true,
                scope_name: Some(scope.name),
                remediation: None,
            })
        }
        None => Ok(MembershipResult {
            member: false,
            scope_name: None,
            remediation: Some(authorization_url(client.base_url(), scope_id)),
        }),
    }
}

/// Where the operator can grant the principal access to the scope.
pub fn authorization_url(base_url: &str, scope_id: &str) -> String {
    format!("{base_url}/authorize?scope={scope_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_url_names_the_scope() {
        let url = authorization_url("https://platform.example", "guild-9");
        assert_eq!(url, "https://platform.example/authorize?scope=guild-9");
    }
}
