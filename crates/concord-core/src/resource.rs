use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single declared option on a resource (e.g. a command argument).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOption {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// Declarative target definition for one named resource.
///
/// `name` is the sole matching key against remote state and must be unique
/// within a desired set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredResource {
    pub name: String,
    pub description: String,
    pub kind: String,
    #[serde(default)]
    pub options: Vec<ResourceOption>,
}

/// Observed state of one resource on the remote platform.
///
/// `id` is platform-assigned and only known after creation. The platform
/// may omit `options` entirely for resources that have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub options: Vec<ResourceOption>,
}

impl DesiredResource {
    /// True when the remote record already matches this spec on every
    /// declared field. The remote `id` is not part of the comparison.
    pub fn matches(&self, remote: &RemoteResource) -> bool {
        self.description == remote.description
            && self.kind == remote.kind
            && self.options == remote.options
    }
}

/// Validate a desired set: every name non-empty, every name unique.
pub fn validate_desired(desired: &[DesiredResource]) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for spec in desired {
        if spec.name.trim().is_empty() {
            return Err(CoreError::Validation("resource with empty name".into()));
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(CoreError::Validation(format!(
                "duplicate resource name: {}",
                spec.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> DesiredResource {
        DesiredResource {
            name: name.to_string(),
            description: "a resource".to_string(),
            kind: "command".to_string(),
            options: vec![],
        }
    }

    #[test]
    fn unique_names_pass() {
        assert!(validate_desired(&[spec("status"), spec("deploy")]).is_ok());
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = validate_desired(&[spec("status"), spec("status")])
            .expect_err("duplicates must be rejected");
        assert!(err.to_string().contains("duplicate resource name"));
    }

    #[test]
    fn empty_name_rejected() {
        assert!(validate_desired(&[spec("  ")]).is_err());
    }

    #[test]
    fn matches_ignores_remote_id() {
        let desired = spec("status");
        let remote = RemoteResource {
            id: "r1".to_string(),
            name: "status".to_string(),
            description: "a resource".to_string(),
            kind: "command".to_string(),
            options: vec![],
        };
        assert!(desired.matches(&remote));
    }

    #[test]
    fn matches_detects_option_drift() {
        let mut desired = spec("status");
        desired.options.push(ResourceOption {
            name: "verbose".to_string(),
            description: "more detail".to_string(),
            required: false,
        });
        let remote = RemoteResource {
            id: "r1".to_string(),
            name: "status".to_string(),
            description: "a resource".to_string(),
            kind: "command".to_string(),
            options: vec![],
        };
        assert!(!desired.matches(&remote));
    }
}
