//! Icecast Exporter — Entry Point
//!
//! Polls an Icecast status endpoint and republishes listener counts
//! as Prometheus gauges. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Parse CLI flags / env vars, merge with optional config.toml, validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create the metrics registry and health state
//! 4. Spawn metrics server on :<port><path> (+ /live, /ready)
//! 5. Spawn the poll loop (Icecast client + optional VClock notifier)
//! 6. Wait for SIGINT → broadcast shutdown → drain tasks → exit

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};

use icecast_exporter::adapters::metrics::{HealthState, MetricsRegistry};
use icecast_exporter::adapters::notify::VClockNotifier;
use icecast_exporter::adapters::status::IcecastStatusClient;
use icecast_exporter::config::{loader, ConfigOverrides};
use icecast_exporter::domain::FailurePolicy;
use icecast_exporter::usecases::{PollExit, Poller};

#[derive(Parser)]
#[command(name = "icecast-exporter")]
#[command(version)]
#[command(about = "Prometheus exporter for Icecast listener counts")]
#[command(long_about = None)]
struct Cli {
    /// Icecast status endpoint (normally: http://icecast.example.com/status-json.xsl)
    #[arg(short, long, env = "ICECAST_URL", value_name = "URL")]
    url: Option<String>,

    /// Port to listen on for metrics
    #[arg(short, long, env = "EXPORTER_PORT", value_name = "PORT")]
    port: Option<u16>,

    /// Metrics endpoint to listen on
    #[arg(short, long, env = "EXPORTER_ENDPOINT", value_name = "PATH")]
    endpoint: Option<String>,

    /// Seconds between Icecast status polls
    #[arg(short, long, env = "EXPORTER_INTERVAL", value_name = "SECONDS")]
    interval: Option<u64>,

    /// VClock receiver (host or host:port, port 80 by default) to forward the total listener count to
    #[arg(long, env = "VCLOCK_TARGET", value_name = "HOST[:PORT]")]
    clock: Option<String>,

    /// Behaviour after a failed poll: resilient or fail-fast
    #[arg(long, env = "EXPORTER_FAILURE_POLICY", value_name = "POLICY")]
    failure_policy: Option<FailurePolicy>,

    /// Optional configuration file
    #[arg(short, long, env = "EXPORTER_CONFIG", value_name = "FILE")]
    config: Option<String>,

    /// Log level (overridden by RUST_LOG)
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            status_url: self.url.clone(),
            port: self.port,
            path: self.endpoint.clone(),
            poll_interval_seconds: self.interval,
            notify_target: self.clock.clone(),
            failure_policy: self.failure_policy,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Resolve configuration (fatal before anything binds) ─
    let cli = Cli::parse();
    let config = loader::load_config(cli.config.as_deref(), cli.overrides())
        .context("Invalid configuration, see 'icecast-exporter --help'")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.exporter.log_level)
            }),
        )
        .json()
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        url = %config.exporter.status_url,
        interval_secs = config.exporter.poll_interval_seconds,
        policy = %config.exporter.failure_policy,
        notify = config.notify.target.as_deref().unwrap_or("disabled"),
        "Starting Icecast Exporter"
    );

    // ── 3. Shared state ─────────────────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let registry = Arc::new(MetricsRegistry::new().context("Failed to build metrics registry")?);
    let health = Arc::new(HealthState::new());

    // ── 4. Metrics server ───────────────────────────────────
    let mut metrics_handle = tokio::spawn(Arc::clone(&registry).serve(
        config.metrics.bind_address(),
        config.metrics.path.clone(),
        Arc::clone(&health),
        shutdown_tx.subscribe(),
    ));

    // ── 5. Poll loop ────────────────────────────────────────
    let source = Arc::new(
        IcecastStatusClient::new(config.exporter.status_url.clone())
            .context("Failed to create Icecast client")?,
    );
    let mut poller = Poller::new(
        source,
        Arc::clone(&registry),
        Arc::clone(&health),
        config.exporter.poll_interval(),
        config.exporter.failure_policy,
    );
    if let Some(target) = &config.notify.target {
        let notifier = VClockNotifier::new(target.clone()).context("Failed to create VClock notifier")?;
        poller = poller.with_notifier(Arc::new(notifier));
    }

    let poll_shutdown = shutdown_tx.subscribe();
    let poller_handle = tokio::spawn(async move {
        match poller.run(poll_shutdown).await {
            PollExit::Shutdown => info!("Poll loop stopped cleanly"),
            PollExit::Halted => warn!("Polling halted — metrics endpoint keeps serving last values"),
        }
    });

    info!("All tasks spawned — exporter is running");

    // ── 6. Wait for SIGINT, or a dead metrics server ────────
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
        res = &mut metrics_handle => {
            let _ = shutdown_tx.send(());
            return match res {
                Ok(Ok(())) => Err(anyhow::anyhow!("Metrics server exited unexpectedly")),
                Ok(Err(e)) => Err(e.context("Metrics server failed")),
                Err(e) => Err(anyhow::Error::new(e).context("Metrics server task panicked")),
            };
        }
    }

    let _ = shutdown_tx.send(());
    info!("Shutdown signal broadcast to all tasks");

    let _ = tokio::time::timeout(Duration::from_secs(5), poller_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), metrics_handle).await;

    info!("Shutdown complete");
    Ok(())
}
