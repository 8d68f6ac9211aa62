//! Run orchestration and the stage state machine.
//!
//! Full pipeline: auth → membership → enumerate → diff → apply → verify →
//! record. Every stage before `Applying` is fail-fast and terminal on
//! error; per-item failures inside `Applying` never abort the run. Every
//! run, including one that fails before any mutation, yields evidence.

use std::time::{Duration, Instant};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use concord_api::{PlatformClient, Principal};
use concord_core::{DesiredResource, redact, validate_desired};

use crate::auth;
use crate::converge::{self, Convergence};
use crate::diff::{self, DiffPlan};
use crate::enumerate;
use crate::error::EngineError;
use crate::evidence::{RunEvidence, RunFailure, summarize};
use crate::membership;
use crate::upsert::{self, AppliedResult};

/// Reconciliation mode: plan only, or plan and apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Check,
    Apply,
}

/// Stages of a reconciliation run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Init,
    AuthVerified,
    MembershipVerified,
    Enumerated,
    Planned,
    Applying,
    Verified,
    Done,
    Failed,
}

/// Knobs for one run. Pacing and budget are plain fields so tests are not
/// wall-clock bound.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed delay between consecutive apply operations, independent of
    /// 429 handling.
    pub pacing: Duration,
    /// Whole-run wall-clock budget.
    pub budget: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(200),
            budget: Duration::from_secs(300),
        }
    }
}

/// Why the run ended, from the caller's perspective.
#[derive(Debug)]
pub enum RunStatus {
    /// Apply mode: everything converged with no per-item failures.
    /// Check mode: nothing to change.
    Converged,
    /// Plan entries remain (check mode), or desired names are still
    /// missing or some entries failed (apply mode).
    Incomplete,
    /// A stage before `Applying` failed; no mutations were attempted
    /// beyond what the evidence records.
    Failed(EngineError),
}

/// A finished run: the caller-facing status plus the evidence record.
#[derive(Debug)]
pub struct RunReport {
    pub status: RunStatus,
    pub evidence: RunEvidence,
}

/// One reconciliation engine instance owning its client and settings; no
/// state is shared between runs or scopes.
pub struct Reconciler {
    client: PlatformClient,
    config: EngineConfig,
}

struct StageOutput {
    principal: Principal,
    plan: DiffPlan,
    applied: Vec<AppliedResult>,
    convergence: Convergence,
}

impl Reconciler {
    pub fn new(client: PlatformClient) -> Self {
        Self {
            client,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full pipeline for one scope.
    pub fn run(
        &self,
        credential: &str,
        scope_id: &str,
        desired: &[DesiredResource],
        mode: Mode,
    ) -> RunReport {
        let run_id = Uuid::new_v4();
        let timestamp = Timestamp::now();
        let deadline = Instant::now() + self.config.budget;
        let credential_print = redact::fingerprint(credential);

        tracing::info!(run = %run_id, scope = %scope_id, mode = ?mode, "reconciliation run started");

        let mut stage = RunStage::Init;
        match self.run_stages(credential, scope_id, desired, mode, deadline, &mut stage) {
            Ok(out) => {
                let summary = summarize(out.plan.len(), &out.applied);
                let status = match mode {
                    Mode::Check => {
                        if out.plan.is_empty() && out.convergence.complete() {
                            RunStatus::Converged
                        } else {
                            RunStatus::Incomplete
                        }
                    }
                    Mode::Apply => {
                        if out.convergence.complete() && summary.failed == 0 {
                            RunStatus::Converged
                        } else {
                            RunStatus::Incomplete
                        }
                    }
                };
                tracing::info!(
                    run = %run_id,
                    created = summary.created,
                    updated = summary.updated,
                    failed = summary.failed,
                    missing = out.convergence.missing.len(),
                    "reconciliation run finished"
                );
                RunReport {
                    status,
                    evidence: RunEvidence {
                        run_id,
                        timestamp,
                        mode,
                        scope: scope_id.to_string(),
                        principal: Some(out.principal),
                        credential: credential_print,
                        stage: RunStage::Done,
                        plan: out.plan.entries,
                        applied: out.applied,
                        convergence: out.convergence,
                        summary,
                        failure: None,
                    },
                }
            }
            Err(err) => {
                tracing::error!(run = %run_id, stage = ?stage, error = %err, "reconciliation run failed");
                let evidence = RunEvidence {
                    run_id,
                    timestamp,
                    mode,
                    scope: scope_id.to_string(),
                    principal: None,
                    credential: credential_print,
                    stage: RunStage::Failed,
                    plan: vec![],
                    applied: vec![],
                    convergence: Convergence::default(),
                    summary: Default::default(),
                    failure: Some(RunFailure {
                        stage,
                        message: err.to_string(),
                    }),
                };
                RunReport {
                    status: RunStatus::Failed(err),
                    evidence,
                }
            }
        }
    }

    fn run_stages(
        &self,
        credential: &str,
        scope_id: &str,
        desired: &[DesiredResource],
        mode: Mode,
        deadline: Instant,
        stage: &mut RunStage,
    ) -> Result<StageOutput, EngineError> {
        // Init: everything that can fail before the first network call.
        validate_desired(desired)?;

        let principal = auth::verify(&self.client, credential)?;
        *stage = RunStage::AuthVerified;

        self.check_budget(deadline)?;
        let membership = membership::verify(&self.client, scope_id)?;
        if !membership.member {
            let remediation = membership
                .remediation
                .unwrap_or_else(|| membership::authorization_url(self.client.base_url(), scope_id));
            return Err(EngineError::MembershipDenied {
                scope: scope_id.to_string(),
                remediation,
            });
        }
        *stage = RunStage::MembershipVerified;

        self.check_budget(deadline)?;
        let actual = enumerate::list(&self.client, scope_id)?;
        *stage = RunStage::Enumerated;

        let plan = diff::plan(desired, &actual);
        *stage = RunStage::Planned;
        tracing::info!(
            creates = plan.creates(),
            updates = plan.updates(),
            "plan computed"
        );

        let applied = match mode {
            Mode::Check => Vec::new(),
            Mode::Apply => {
                *stage = RunStage::Applying;
                upsert::apply(&self.client, scope_id, &plan, self.config.pacing, deadline)
            }
        };

        let convergence = match mode {
            // Check mode never mutated anything; the first listing is
            // still authoritative.
            Mode::Check => converge::against(&actual, desired, &applied),
            Mode::Apply => match converge::verify(&self.client, scope_id, desired, &applied) {
                Ok(c) => c,
                Err(err) => {
                    // Mutations already happened; don't lose their evidence
                    // over a failed re-enumeration.
                    tracing::warn!(
                        error = %err,
                        "re-enumeration failed, falling back to applied results"
                    );
                    converge::against(&[], desired, &applied)
                }
            },
        };
        *stage = RunStage::Verified;

        Ok(StageOutput {
            principal,
            plan,
            applied,
            convergence,
        })
    }

    fn check_budget(&self, deadline: Instant) -> Result<(), EngineError> {
        if Instant::now() >= deadline {
            return Err(EngineError::Budget {
                budget_secs: self.config.budget.as_secs(),
            });
        }
        Ok(())
    }
}
