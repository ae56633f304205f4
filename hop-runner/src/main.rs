//! Hop Runner CLI
//!
//! Runs one pipeline or workflow on a Hop server and exits non-zero if it
//! does not finish cleanly. Ctrl-C stops the execution on the server.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hop_client::HopServerClient;
use hop_core::domain::job::JobSpec;
use hop_core::domain::variable::Variable;
use hop_runner::{Config, ExecutionPoller};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Connection and project flags override the `HOP_*` environment variable of
/// the same name; `Config::from_env` resolves both.
#[derive(Parser)]
#[command(name = "hop-runner")]
#[command(about = "Run Apache Hop pipelines and workflows on a Hop server", long_about = None)]
struct Cli {
    /// Hop server host [env: HOP_HOST]
    #[arg(long)]
    host: Option<String>,

    /// Hop server port [env: HOP_PORT, default: 8080]
    #[arg(long)]
    port: Option<u16>,

    /// [env: HOP_USER]
    #[arg(long)]
    user: Option<String>,

    /// [env: HOP_PASSWORD]
    #[arg(long)]
    password: Option<String>,

    /// Directory containing hop-config.json [env: HOP_CONFIG_PATH]
    #[arg(long)]
    config_path: Option<PathBuf>,

    /// Project name as declared in hop-config.json [env: HOP_PROJECT]
    #[arg(long)]
    project: Option<String>,

    /// Project home, overriding the one in hop-config.json [env: HOP_PROJECT_PATH]
    #[arg(long)]
    project_path: Option<PathBuf>,

    /// Lifecycle environment [env: HOP_ENVIRONMENT]
    #[arg(long)]
    environment: Option<String>,

    /// Directory holding the environment configuration files [env: HOP_ENVIRONMENT_PATH]
    #[arg(long)]
    environment_path: Option<PathBuf>,

    /// Hop log level, e.g. Basic or Detailed [env: HOP_LOG_LEVEL, default: Basic]
    #[arg(long)]
    log_level: Option<String>,

    /// Seconds between two status polls [env: HOP_POLL_INTERVAL, default: 5]
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Stop the execution after this many seconds [env: HOP_DEADLINE]
    #[arg(long)]
    deadline: Option<u64>,

    /// Task parameter passed to the execution (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param, global = true)]
    params: Vec<Variable>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pipeline
    Pipeline {
        /// Pipeline file, relative to the project home
        file: String,

        /// Pipeline run configuration from the project metadata
        #[arg(long)]
        run_config: Option<String>,
    },
    /// Run a workflow
    Workflow {
        /// Workflow file, relative to the project home
        file: String,
    },
}

impl Cli {
    /// Splits the arguments into the job to run and the configuration overrides
    fn into_parts(self) -> (HashMap<&'static str, String>, JobSpec) {
        let spec = match self.command {
            Commands::Pipeline { file, run_config } => JobSpec::pipeline(file, run_config),
            Commands::Workflow { file } => JobSpec::workflow(file),
        }
        .with_params(self.params);

        let path = |p: PathBuf| p.to_string_lossy().into_owned();
        let overrides = [
            ("HOP_HOST", self.host),
            ("HOP_PORT", self.port.map(|p| p.to_string())),
            ("HOP_USER", self.user),
            ("HOP_PASSWORD", self.password),
            ("HOP_CONFIG_PATH", self.config_path.map(path)),
            ("HOP_PROJECT", self.project),
            ("HOP_PROJECT_PATH", self.project_path.map(path)),
            ("HOP_ENVIRONMENT", self.environment),
            ("HOP_ENVIRONMENT_PATH", self.environment_path.map(path)),
            ("HOP_LOG_LEVEL", self.log_level),
            ("HOP_POLL_INTERVAL", self.poll_interval.map(|s| s.to_string())),
            ("HOP_DEADLINE", self.deadline.map(|s| s.to_string())),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect();

        (overrides, spec)
    }
}

fn parse_param(value: &str) -> std::result::Result<Variable, String> {
    Variable::parse_assignment(value).ok_or_else(|| format!("expected KEY=VALUE, got {}", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hop_runner=info,hop_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (overrides, spec) = Cli::parse().into_parts();
    let config = Config::from_env(&overrides).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(
        "Running {} {} on {}:{} (project {})",
        spec.kind, spec.path, config.host, config.port, config.project
    );

    let client = Arc::new(HopServerClient::new(config.connection()));

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping execution");
            interrupt.cancel();
        }
    });

    let mut poller = ExecutionPoller::new(client, config.poller());
    let report = poller
        .run(&spec, cancel)
        .await
        .with_context(|| format!("Failed to run {} {}", spec.kind, spec.path))?;

    info!(
        "{} {} with {} log line(s)",
        report.handle, report.final_status, report.lines_emitted
    );
    Ok(())
}
