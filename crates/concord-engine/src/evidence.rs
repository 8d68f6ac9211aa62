//! The immutable, redacted run record.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use concord_api::Principal;
use concord_core::redact;

use crate::converge::Convergence;
use crate::diff::{DiffAction, DiffEntry};
use crate::run::{Mode, RunStage};
use crate::upsert::{AppliedResult, ApplyStatus};

/// Counts over the applied results.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub total: usize,
}

/// The stage a fatal error occurred in, with its message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFailure {
    pub stage: RunStage,
    pub message: String,
}

/// Write-once record of what a reconciliation run observed and did.
///
/// Built exactly once at the end of a run, including runs that fail
/// before any mutation was attempted. Credential material is reduced to
/// a fixed-length fingerprint before the record is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvidence {
    pub run_id: Uuid,
    pub timestamp: Timestamp,
    pub mode: Mode,
    pub scope: String,
    pub principal: Option<Principal>,
    /// Fingerprint of the credential used, last four characters only.
    pub credential: String,
    /// The final stage the run reached.
    pub stage: RunStage,
    pub plan: Vec<DiffEntry>,
    pub applied: Vec<AppliedResult>,
    pub convergence: Convergence,
    pub summary: RunSummary,
    pub failure: Option<RunFailure>,
}

impl RunEvidence {
    /// Serialize with the secret-field redaction walk applied, so evidence
    /// leaving the engine cannot carry raw credential material even if a
    /// desired spec smuggled some in.
    pub fn to_redacted_json(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        redact::redact_json(&mut value);
        Ok(value)
    }
}

/// Count creates, updates and failures across the applied results.
pub fn summarize(plan_len: usize, applied: &[AppliedResult]) -> RunSummary {
    let created = applied
        .iter()
        .filter(|r| r.status == ApplyStatus::Ok && r.action == DiffAction::Create)
        .count();
    let updated = applied
        .iter()
        .filter(|r| r.status == ApplyStatus::Ok && r.action == DiffAction::Update)
        .count();
    let failed = applied
        .iter()
        .filter(|r| r.status == ApplyStatus::Error)
        .count();
    RunSummary {
        created,
        updated,
        failed,
        total: plan_len,
    }
}
