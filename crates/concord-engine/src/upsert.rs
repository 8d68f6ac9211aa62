//! Sequential plan application.

use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use concord_api::PlatformClient;

use crate::diff::{DiffAction, DiffEntry, DiffPlan};

/// Outcome of one apply attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedResult {
    pub name: String,
    pub action: DiffAction,
    pub status: ApplyStatus,
    pub remote_id: Option<String>,
    pub error: Option<String>,
}

/// Apply the plan strictly sequentially, pacing between operations as an
/// extra throttle independent of 429 handling.
///
/// A failing entry is recorded and the loop moves on; one bad resource
/// never aborts the run. Entries reached after the wall-clock deadline
/// are recorded as errors without issuing their calls.
pub fn apply(
    client: &PlatformClient,
    scope_id: &str,
    plan: &DiffPlan,
    pacing: Duration,
    deadline: Instant,
) -> Vec<AppliedResult> {
    let mut results = Vec::with_capacity(plan.entries.len());

    for (index, entry) in plan.entries.iter().enumerate() {
        if Instant::now() >= deadline {
            tracing::warn!(
                name = %entry.spec.name,
                "run budget exceeded, recording remaining entries as failed"
            );
            results.push(AppliedResult {
                name: entry.spec.name.clone(),
                action: entry.action,
                status: ApplyStatus::Error,
                remote_id: entry.existing_id.clone(),
                error: Some("run budget exceeded before this entry was applied".into()),
            });
            continue;
        }
        if index > 0 && !pacing.is_zero() {
            thread::sleep(pacing);
        }
        results.push(apply_entry(client, scope_id, entry));
    }

    results
}

fn apply_entry(client: &PlatformClient, scope_id: &str, entry: &DiffEntry) -> AppliedResult {
    let outcome = match (entry.action, entry.existing_id.as_deref()) {
        (DiffAction::Create, _) => client.create_resource(scope_id, &entry.spec),
        (DiffAction::Update, Some(id)) => client.update_resource(scope_id, id, &entry.spec),
        // The planner always sets existing_id on updates; if it is somehow
        // absent, creating is still safe while replacing is not.
        (DiffAction::Update, None) => client.create_resource(scope_id, &entry.spec),
    };

    match outcome {
        Ok(remote) => {
            tracing::info!(
                name = %entry.spec.name,
                action = ?entry.action,
                id = %remote.id,
                "resource applied"
            );
            AppliedResult {
                name: entry.spec.name.clone(),
                action: entry.action,
                status: ApplyStatus::Ok,
                remote_id: Some(remote.id),
                error: None,
            }
        }
        Err(err) => {
            tracing::warn!(name = %entry.spec.name, error = %err, "apply failed, continuing");
            AppliedResult {
                name: entry.spec.name.clone(),
                action: entry.action,
                status: ApplyStatus::Error,
                remote_id: entry.existing_id.clone(),
                error: Some(err.to_string()),
            }
        }
    }
}
