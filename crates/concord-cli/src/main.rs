mod config;
mod render;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use concord_api::{PlatformClient, RateLimitedTransport};
use concord_core::load_desired;
use concord_engine::{EngineError, Mode, Reconciler, RunEvidence, RunStatus};

use crate::config::{Config, ConfigArgs};

const EXIT_OK: i32 = 0;
const EXIT_FATAL: i32 = 1;
const EXIT_MEMBERSHIP: i32 = 2;
const EXIT_INCOMPLETE: i32 = 3;

#[derive(Parser)]
#[command(
    name = "concord",
    about = "Reconcile a remote command set against a declared desired state",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one reconciliation pass: auth, membership, enumerate, diff, apply, verify
    Reconcile {
        /// Plan only (check) or plan and apply (apply)
        #[arg(long, value_enum, default_value = "check")]
        mode: ModeArg,

        /// Platform credential (default: CONCORD_CREDENTIAL, then CONCORD_TOKEN)
        #[arg(long)]
        credential: Option<String>,

        /// Target scope id (default: CONCORD_SCOPE)
        #[arg(long)]
        scope: Option<String>,

        /// Path to the desired-set JSON file
        #[arg(long)]
        desired: PathBuf,

        /// Platform API base URL (default: CONCORD_API_URL)
        #[arg(long)]
        base_url: Option<String>,

        /// Directory for evidence artifacts (default: CONCORD_EVIDENCE_DIR, then ./evidence)
        #[arg(long)]
        evidence_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Check,
    Apply,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Check => Mode::Check,
            ModeArg::Apply => Mode::Apply,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let code = match cli.command {
        Commands::Reconcile {
            mode,
            credential,
            scope,
            desired,
            base_url,
            evidence_dir,
        } => cmd_reconcile(ConfigArgs {
            mode: mode.into(),
            credential,
            scope,
            base_url,
            desired,
            evidence_dir,
        }),
    };
    std::process::exit(code);
}

fn cmd_reconcile(args: ConfigArgs) -> i32 {
    let config = match Config::resolve(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return EXIT_FATAL;
        }
    };

    let desired = match load_desired(&config.desired) {
        Ok(desired) => desired,
        Err(err) => {
            eprintln!("error: {err}");
            return EXIT_FATAL;
        }
    };

    let transport = RateLimitedTransport::new(config.credential.clone());
    let client = PlatformClient::new(config.base_url.clone(), transport);
    let reconciler = Reconciler::new(client);

    let report = reconciler.run(&config.credential, &config.scope, &desired, config.mode);

    if let Err(err) = write_evidence(&config.evidence_dir, &report.evidence) {
        eprintln!("warning: could not write evidence: {err}");
    }
    render::print_summary(&report);

    match &report.status {
        RunStatus::Converged => EXIT_OK,
        RunStatus::Incomplete => EXIT_INCOMPLETE,
        RunStatus::Failed(err) => {
            eprintln!("error: {err}");
            exit_code_for(err)
        }
    }
}

fn exit_code_for(err: &EngineError) -> i32 {
    match err {
        EngineError::MembershipDenied { .. } => EXIT_MEMBERSHIP,
        _ => EXIT_FATAL,
    }
}

/// Persist the JSON artifact and its text rendering. Writes are atomic
/// (tmp + rename) so an interrupted run never leaves half-written
/// evidence behind.
fn write_evidence(dir: &Path, evidence: &RunEvidence) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)?;

    let stamp = evidence.timestamp.strftime("%Y%m%dT%H%M%SZ");
    let run = evidence.run_id.simple().to_string();
    let base = format!("{stamp}-{}-{}", sanitize(&evidence.scope), &run[..8]);

    let json = serde_json::to_vec_pretty(&evidence.to_redacted_json()?)?;
    write_atomic(&dir.join(format!("{base}.json")), &json)?;
    write_atomic(
        &dir.join(format!("{base}.txt")),
        render::render_text(evidence).as_bytes(),
    )?;

    tracing::info!(dir = %dir.display(), base = %base, "evidence written");
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Keep scope ids filename-safe.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
