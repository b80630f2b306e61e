use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use snapshotter::{Rotator, Severity, TracingSink};
use snapshotter_cloud::SnapshotGateway;
use snapshotter_cloud_digitalocean::DigitalOceanProvider;
use snapshotter_config::{
    ENV_API_URL, ENV_SNAPSHOT_COUNT, ENV_TIMEOUT_SECS, ENV_TOKEN, ENV_VOLUMES, Settings,
    SnapshotterConfig,
};
use tracing_subscriber::EnvFilter;

const EXIT_FATAL: u8 = 1;
const EXIT_HALTED: u8 = 2;

#[derive(Parser)]
#[command(name = "snapshotter")]
#[command(version)]
#[command(
    about = "Snapshot DigitalOcean volumes and delete the oldest snapshots beyond a retention count",
    long_about = None
)]
struct Cli {
    /// DigitalOcean API token
    #[arg(long, env = ENV_TOKEN, hide_env_values = true)]
    token: Option<String>,

    /// Comma-separated volume ids, processed in order
    #[arg(long, env = ENV_VOLUMES)]
    volumes: Option<String>,

    /// Number of snapshots to keep per volume
    #[arg(long, env = ENV_SNAPSHOT_COUNT)]
    snapshot_count: Option<String>,

    /// API base URL
    #[arg(long, env = ENV_API_URL)]
    api_url: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = ENV_TIMEOUT_SECS)]
    timeout_secs: Option<String>,

    /// Log filter (overrides RUST_LOG, default "info")
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            token: self.token.clone(),
            volumes: self.volumes.clone(),
            snapshot_count: self.snapshot_count.clone(),
            api_url: self.api_url.clone(),
            timeout_secs: self.timeout_secs.clone(),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.log_level.as_deref());

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(fatal = true, "{:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Logs go to stdout as plain text lines
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_ansi(std::io::stdout().is_terminal())
        .init();
}

async fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let config = SnapshotterConfig::from_settings(cli.settings())?;

    let provider = DigitalOceanProvider::new(&config.provider)
        .context("Failed to initialize DigitalOcean client")?;

    tracing::debug!(
        provider = provider.name(),
        api_url = %config.provider.api_url,
        volumes = config.retention.volume_ids.len(),
        keep = config.retention.snapshot_count,
        "Starting snapshot rotation"
    );

    let rotator = Rotator::new(provider, TracingSink, config.retention);

    // The rotator has already reported the error through its sink.
    let code = match rotator.run().await {
        Ok(report) => {
            tracing::debug!(
                "Rotation finished: {} created, {} deleted",
                report.created_count(),
                report.deleted_count()
            );
            ExitCode::SUCCESS
        }
        Err(err) => match err.severity() {
            Severity::Fatal => ExitCode::from(EXIT_FATAL),
            Severity::Halt => ExitCode::from(EXIT_HALTED),
        },
    };

    Ok(code)
}
