//! Convergence verification.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use concord_api::PlatformClient;
use concord_core::{DesiredResource, RemoteResource};

use crate::enumerate;
use crate::error::EngineError;
use crate::upsert::{AppliedResult, ApplyStatus};

/// Names from the desired set that the platform does not yet hold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Convergence {
    pub missing: Vec<String>,
}

impl Convergence {
    pub fn complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compare a (possibly stale) actual listing against the desired set.
///
/// A name whose apply succeeded this run counts as present even when the
/// eventually-consistent listing has not caught up yet.
pub fn against(
    actual: &[RemoteResource],
    desired: &[DesiredResource],
    applied: &[AppliedResult],
) -> Convergence {
    let present: HashSet<&str> = actual.iter().map(|r| r.name.as_str()).collect();
    let succeeded: HashSet<&str> = applied
        .iter()
        .filter(|r| r.status == ApplyStatus::Ok)
        .map(|r| r.name.as_str())
        .collect();

    let missing = desired
        .iter()
        .filter(|d| !present.contains(d.name.as_str()) && !succeeded.contains(d.name.as_str()))
        .map(|d| d.name.clone())
        .collect();

    Convergence { missing }
}

/// Re-enumerate the scope and report every desired name still absent.
pub fn verify(
    client: &PlatformClient,
    scope_id: &str,
    desired: &[DesiredResource],
    applied: &[AppliedResult],
) -> Result<Convergence, EngineError> {
    let refreshed = enumerate::list(client, scope_id)?;
    Ok(against(&refreshed, desired, applied))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffAction;

    fn desired(name: &str) -> DesiredResource {
        DesiredResource {
            name: name.to_string(),
            description: "d".to_string(),
            kind: "command".to_string(),
            options: vec![],
        }
    }

    fn remote(name: &str) -> RemoteResource {
        RemoteResource {
            id: format!("r-{name}"),
            name: name.to_string(),
            description: "d".to_string(),
            kind: "command".to_string(),
            options: vec![],
        }
    }

    fn applied_ok(name: &str) -> AppliedResult {
        AppliedResult {
            name: name.to_string(),
            action: DiffAction::Create,
            status: ApplyStatus::Ok,
            remote_id: Some(format!("r-{name}")),
            error: None,
        }
    }

    #[test]
    fn missing_names_are_reported() {
        let c = against(&[remote("alpha")], &[desired("alpha"), desired("bravo")], &[]);
        assert_eq!(c.missing, ["bravo"]);
        assert!(!c.complete());
    }

    #[test]
    fn successful_apply_counts_as_present() {
        // Listing lag: bravo was just created but the refreshed listing
        // does not show it yet.
        let c = against(
            &[remote("alpha")],
            &[desired("alpha"), desired("bravo")],
            &[applied_ok("bravo")],
        );
        assert!(c.complete());
    }

    #[test]
    fn empty_desired_set_is_always_converged() {
        assert!(against(&[], &[], &[]).complete());
    }
}
