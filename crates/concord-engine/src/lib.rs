//! concord-engine
//!
//! Reconciliation engine for a remote command-set style resource
//! collection: verify identity and scope access, enumerate current state,
//! plan the minimal set of creates and updates, apply them one at a time
//! through the rate-limited transport, verify convergence, and emit a
//! redacted evidence record.
//!
//! Public API:
//! - `Reconciler::run()`: full pipeline for one scope
//! - `diff::plan()`: pure desired-vs-actual planning
//! - `RunEvidence`: the immutable, redacted run record
//!
//! The engine never deletes a remote resource. Resources present remotely
//! but absent from the desired set are left untouched.

pub mod auth;
pub mod converge;
pub mod diff;
pub mod enumerate;
pub mod error;
pub mod evidence;
pub mod membership;
pub mod run;
pub mod upsert;

pub use crate::converge::Convergence;
pub use crate::diff::{DiffAction, DiffEntry, DiffPlan};
pub use crate::error::EngineError;
pub use crate::evidence::{RunEvidence, RunFailure, RunSummary};
pub use crate::membership::MembershipResult;
pub use crate::run::{EngineConfig, Mode, Reconciler, RunReport, RunStage, RunStatus};
pub use crate::upsert::{AppliedResult, ApplyStatus};
