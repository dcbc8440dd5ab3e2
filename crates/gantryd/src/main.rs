//! gantryd - toll-lane telemetry gateway daemon.
//!
//! Receives framed lane telemetry over TCP, tracks lane liveness, and fans
//! decoded events out to subscribed WebSocket clients.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gantry_ingest::{EventPipeline, LivenessMonitor, MetricIngestor, MonitorServer};
use gantry_push::{ClientRegistry, HeartbeatService};
use gantry_state::{LaneStateStore, LivenessTable};
use gantry_topology::{StaticTopology, TopologyResolver};
use gantryd::config::GatewayConfig;
use gantryd::http::{AppState, create_router};

#[derive(Parser)]
#[command(name = "gantryd")]
#[command(about = "Toll-lane telemetry gateway")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the gateway
    Run {
        /// Path to config file
        #[arg(short, long, default_value = "/etc/gantry/gantryd.toml")]
        config: PathBuf,
    },

    /// Parse and validate a config file, then exit
    CheckConfig {
        /// Path to config file
        #[arg(short, long, default_value = "/etc/gantry/gantryd.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config } => {
            let config = GatewayConfig::from_file(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            run(config).await
        }
        Commands::CheckConfig { config } => {
            GatewayConfig::from_file(&config)
                .with_context(|| format!("loading {}", config.display()))?;
            println!("config ok");
            Ok(())
        }
    }
}

async fn run(config: GatewayConfig) -> anyhow::Result<()> {
    let topology: Arc<dyn TopologyResolver> =
        Arc::new(StaticTopology::from_file(&config.topology).context("loading topology")?);
    let store = Arc::new(LaneStateStore::seeded(&topology.lanes()));
    let liveness = Arc::new(LivenessTable::new());
    let registry = Arc::new(ClientRegistry::new());

    let pipeline = Arc::new(EventPipeline::new(
        Arc::clone(&store),
        Arc::clone(&liveness),
        Arc::clone(&registry),
    ));
    let ingestor = Arc::new(MetricIngestor::new(
        Arc::clone(&topology),
        Arc::clone(&store),
        Arc::clone(&registry),
        config.allowed_metrics(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let monitor = MonitorServer::bind(
        &config.monitor.listen,
        Arc::clone(&topology),
        pipeline,
        config.debug,
    )
    .await?;
    tokio::spawn(monitor.run(shutdown_rx.clone()));

    let liveness_monitor = LivenessMonitor::new(
        Arc::clone(&liveness),
        Arc::clone(&store),
        Arc::clone(&registry),
        Duration::from_millis(config.liveness.poll_millis),
        chrono::Duration::seconds(config.liveness.stale_secs),
    );
    tokio::spawn(liveness_monitor.run(shutdown_rx.clone()));

    let heartbeat = HeartbeatService::new(
        Arc::clone(&registry),
        Duration::from_secs(config.push.heartbeat_secs),
    );
    tokio::spawn(heartbeat.run(shutdown_rx.clone()));

    let state = Arc::new(AppState {
        registry,
        store,
        liveness,
        topology,
        ingestor,
        default_strategy: config.strategy.clone(),
    });
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.push.listen)
        .await
        .with_context(|| format!("binding push listener on {}", config.push.listen))?;
    info!(addr = %config.push.listen, "push surface listening");

    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        });
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let mut rx = shutdown_rx;
            let _ = rx.changed().await;
        })
        .await
        .context("push surface failed")?;
    let _ = shutdown_tx.send(true);
    Ok(())
}
