//! Startup configuration, resolved exactly once.
//!
//! Precedence per value:
//! 1. CLI flag
//! 2. `CONCORD_*` environment variable
//! 3. Legacy fallback (`CONCORD_TOKEN` for the credential)
//! 4. Built-in default (evidence directory only)
//!
//! Nothing reads the environment after startup.

use std::path::PathBuf;

use anyhow::bail;

use concord_engine::Mode;

const DEFAULT_EVIDENCE_DIR: &str = "evidence";

/// Everything a run needs, fully resolved.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub credential: String,
    pub scope: String,
    pub base_url: String,
    pub desired: PathBuf,
    pub evidence_dir: PathBuf,
}

/// Raw values from the command line, before environment fallback.
#[derive(Debug, Clone)]
pub struct ConfigArgs {
    pub mode: Mode,
    pub credential: Option<String>,
    pub scope: Option<String>,
    pub base_url: Option<String>,
    pub desired: PathBuf,
    pub evidence_dir: Option<PathBuf>,
}

impl Config {
    pub fn resolve(args: ConfigArgs) -> anyhow::Result<Self> {
        Self::resolve_from(args, |name| std::env::var(name).ok())
    }

    fn resolve_from(
        args: ConfigArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let credential = match args
            .credential
            .or_else(|| env("CONCORD_CREDENTIAL"))
            .or_else(|| env("CONCORD_TOKEN"))
        {
            Some(c) => c,
            None => bail!("missing credential: pass --credential or set CONCORD_CREDENTIAL"),
        };

        let scope = match args.scope.or_else(|| env("CONCORD_SCOPE")) {
            Some(s) => s,
            None => bail!("missing scope: pass --scope or set CONCORD_SCOPE"),
        };

        let base_url = match args.base_url.or_else(|| env("CONCORD_API_URL")) {
            Some(u) => u,
            None => bail!("missing platform URL: pass --base-url or set CONCORD_API_URL"),
        };

        let evidence_dir = args
            .evidence_dir
            .or_else(|| env("CONCORD_EVIDENCE_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EVIDENCE_DIR));

        Ok(Self {
            mode: args.mode,
            credential,
            scope,
            base_url,
            desired: args.desired,
            evidence_dir,
        })
    }
}
