//! Health monitor entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use health_monitor::api::{create_router, serve, AppState};
use health_monitor::config::Config;
use health_monitor::metrics;
use health_monitor::monitor::{poll_once, HealthMonitor};
use health_monitor::probe::{HealthClient, ProbeKind};
use health_monitor::utils::shutdown_signal;
use health_monitor::view::html::StatusPage;
use health_monitor::view::HealthView;

/// Backend liveness/readiness monitor.
#[derive(Parser, Debug)]
#[command(name = "health-monitor")]
#[command(about = "Polls backend health endpoints and renders their status")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll continuously and serve the status page (default).
    Run {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Seconds between polls (overrides POLL_INTERVAL_SECS).
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Poll continuously and print the status view on every update.
    Watch {
        /// Seconds between polls (overrides POLL_INTERVAL_SECS).
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Run a single poll cycle; exit non-zero unless live and ready.
    Check,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Make .env visible to RUST_LOG as well as the config
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("health_monitor=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    match args.command {
        Some(Command::Run { port, interval }) => cmd_run(port, interval).await,
        Some(Command::Watch { interval }) => cmd_watch(interval).await,
        Some(Command::Check) => cmd_check().await,
        Some(Command::CheckConfig) => cmd_check_config().await,
        None => cmd_run(None, None).await,
    }
}

/// Load and validate configuration, applying CLI overrides.
fn load_config(port: Option<u16>, interval: Option<u64>) -> anyhow::Result<Config> {
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Some(port) = port {
        config.port = port;
    }
    if let Some(interval) = interval {
        config.poll_interval_secs = interval;
    }

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    Ok(config)
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("HEALTH MONITOR - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Base URL: {}", config.base_url());
    for kind in ProbeKind::ALL {
        println!("  {} URL: {}{}", kind, config.base_url(), kind.path());
    }
    println!("  Poll Interval: {}s", config.poll_interval_secs);
    match config.http_timeout_ms {
        Some(ms) => println!("  HTTP Timeout: {}ms", ms),
        None => println!("  HTTP Timeout: transport default"),
    }
    println!("  Port: {}", config.port);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run a single poll cycle and print the result.
async fn cmd_check() -> anyhow::Result<()> {
    let config = load_config(None, None)?;
    let client = HealthClient::new(&config)?;

    println!("======================================================================");
    println!("HEALTH MONITOR - CHECK {}", config.base_url());
    println!("======================================================================");

    let snapshot = poll_once(&client, 1).await;
    println!("{}", HealthView::from_state(Some(&snapshot)));
    println!("======================================================================");

    if !snapshot.status.is_healthy() {
        anyhow::bail!("backend is not live and ready");
    }

    Ok(())
}

/// Poll continuously, printing the view on every update.
async fn cmd_watch(interval: Option<u64>) -> anyhow::Result<()> {
    let config = load_config(None, interval)?;
    let client = HealthClient::new(&config)?;

    let handle = HealthMonitor::new(client, config.poll_interval()).activate();
    let mut rx = handle.subscribe();

    println!("{}", HealthView::Loading);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = HealthView::from_state(rx.borrow_and_update().as_ref());
                println!("\n{}", view);
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

/// Poll continuously and serve the status page.
async fn cmd_run(port: Option<u16>, interval: Option<u64>) -> anyhow::Result<()> {
    let config = load_config(port, interval)?;

    info!("Configuration loaded successfully");
    info!("Monitoring: {}", config.base_url());
    info!("Poll interval: {}s", config.poll_interval_secs);

    let prometheus = if config.metrics_enabled {
        Some(metrics::init_metrics()?)
    } else {
        None
    };

    // Start polling before the server so the first cycle is already in flight
    let client = HealthClient::new(&config)?;
    let handle = HealthMonitor::new(client, config.poll_interval()).activate();

    // Page reloads track the poll interval
    let page = StatusPage::new(config.poll_interval())?;
    let mut app_state = AppState::new(handle.subscribe(), page);
    if let Some(prometheus) = prometheus {
        app_state = app_state.with_metrics(prometheus);
    }

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let mut server = tokio::spawn(serve(
        listener,
        create_router(app_state),
        shutdown_signal(),
    ));

    let finished = tokio::select! {
        _ = shutdown_signal() => None,
        result = &mut server => Some(result),
    };

    handle.shutdown().await;
    info!("Health monitor stopped");

    // Let in-flight requests drain before the runtime exits
    let result = match finished {
        Some(result) => result,
        None => server.await,
    };
    match result {
        Ok(Ok(())) => info!("HTTP server stopped"),
        Ok(Err(e)) => error!("HTTP server failed: {}", e),
        Err(e) => error!("HTTP server task failed: {}", e),
    }

    Ok(())
}
