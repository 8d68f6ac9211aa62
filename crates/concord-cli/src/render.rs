//! Human-readable rendering of a run.

use concord_engine::{ApplyStatus, DiffAction, RunEvidence, RunReport, RunStatus};

/// Multi-line text rendering of the evidence, persisted next to the JSON
/// artifact.
pub fn render_text(evidence: &RunEvidence) -> String {
    let mut out = String::new();
    let mut line = |s: String| {
        out.push_str(&s);
        out.push('\n');
    };

    line(format!("run        {}", evidence.run_id));
    line(format!("timestamp  {}", evidence.timestamp));
    line(format!("mode       {:?}", evidence.mode));
    line(format!("scope      {}", evidence.scope));
    if let Some(principal) = &evidence.principal {
        line(format!(
            "principal  {} ({})",
            principal.display_name, principal.id
        ));
    }
    line(format!("credential {}", evidence.credential));

    if let Some(failure) = &evidence.failure {
        line(format!("failed at  {:?}", failure.stage));
        line(format!("reason     {}", failure.message));
        return out;
    }

    let creates = evidence
        .plan
        .iter()
        .filter(|e| e.action == DiffAction::Create)
        .count();
    line(format!(
        "plan       {} change(s) ({} create, {} update)",
        evidence.plan.len(),
        creates,
        evidence.plan.len() - creates
    ));
    for result in &evidence.applied {
        let status = match result.status {
            ApplyStatus::Ok => "ok",
            ApplyStatus::Error => "error",
        };
        let detail = result
            .error
            .as_deref()
            .or(result.remote_id.as_deref())
            .unwrap_or("-");
        line(format!(
            "  {:?} {} -> {} ({})",
            result.action, result.name, status, detail
        ));
    }
    if evidence.convergence.complete() {
        line("convergence complete".to_string());
    } else {
        line(format!(
            "convergence missing: {}",
            evidence.convergence.missing.join(", ")
        ));
    }
    line(format!(
        "summary    created={} updated={} failed={} total={}",
        evidence.summary.created,
        evidence.summary.updated,
        evidence.summary.failed,
        evidence.summary.total
    ));
    out
}

/// One-line summary printed to stdout at the end of a run.
pub fn print_summary(report: &RunReport) {
    let evidence = &report.evidence;
    match &report.status {
        RunStatus::Converged => {
            println!(
                "converged: {} created, {} updated",
                evidence.summary.created, evidence.summary.updated
            );
        }
        RunStatus::Incomplete => {
            if evidence.applied.is_empty() {
                println!("not converged: {} change(s) pending", evidence.plan.len());
            } else {
                println!(
                    "incomplete: {} failed, missing: [{}]",
                    evidence.summary.failed,
                    evidence.convergence.missing.join(", ")
                );
            }
        }
        RunStatus::Failed(err) => {
            println!("failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_engine::{Convergence, Mode, RunStage, RunSummary};

    #[test]
    fn failed_run_renders_stage_and_reason() {
        let evidence = RunEvidence {
            run_id: uuid::Uuid::nil(),
            timestamp: jiff::Timestamp::UNIX_EPOCH,
            mode: Mode::Apply,
            scope: "scope-1".to_string(),
            principal: None,
            credential: "****1234".to_string(),
            stage: RunStage::Failed,
            plan: vec![],
            applied: vec![],
            convergence: Convergence::default(),
            summary: RunSummary::default(),
            failure: Some(concord_engine::RunFailure {
                stage: RunStage::Init,
                message: "authentication failed: nope".to_string(),
            }),
        };

        let text = render_text(&evidence);
        assert!(text.contains("failed at  Init"));
        assert!(text.contains("authentication failed"));
        assert!(text.contains("****1234"));
    }
}
