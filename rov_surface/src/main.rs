//! # ROV Surface Station
//!
//! Entry point of the surface station. Loads the configuration, starts the
//! control loops and supervises the link until Ctrl+C.

use clap::Parser;
use rov_common::config::{ConfigLoader, LogLevel, SurfaceConfig};
use rov_control::EvdevGamepad;
use rov_surface::Supervisor;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Grace period for blocking tasks when the runtime shuts down.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// ROV surface station
#[derive(Parser, Debug)]
#[command(name = "surface")]
#[command(version)]
#[command(about = "Surface control station for the ROV")]
struct Args {
    /// Station configuration TOML. Defaults apply when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Onboard controller host, overrides the configuration.
    #[arg(long)]
    host: Option<String>,

    /// Onboard controller port, overrides the configuration.
    #[arg(long)]
    port: Option<u16>,

    /// Run without a gamepad.
    #[arg(long)]
    no_input: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = load_config(&args);

    let level = match &config {
        _ if args.verbose => LogLevel::Debug,
        Ok(config) => config.shared.log_level,
        Err(_) => LogLevel::Info,
    };
    setup_tracing(&args, level);

    info!("ROV surface station v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = config.and_then(|config| run(&args, config)) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("ROV surface station shutdown complete");
}

fn load_config(args: &Args) -> Result<SurfaceConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => SurfaceConfig::load(path)?,
        None => SurfaceConfig::default(),
    };

    if let Some(host) = &args.host {
        config.connection.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.connection.port = port;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args, config: SurfaceConfig) -> Result<(), Box<dyn Error>> {
    info!(
        service = %config.shared.service_name,
        address = %config.connection.address(),
        peer = %config.connection.peer,
        tick_ms = config.control.tick_ms,
        "Config OK"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(async {
        let supervisor = Supervisor::new(config.clone())?;
        let control = supervisor.spawn_control();

        if args.no_input {
            warn!("Manual input disabled");
        } else {
            let device = match EvdevGamepad::from_config(&config.input) {
                Ok(device) => Some(device),
                Err(e) => {
                    error!(error = %e, "Failed to open the game controller");
                    None
                }
            };
            supervisor.spawn_manual(device)?;
        }

        supervisor.supervise(shutdown_signal()).await;
        control.abort();
        Ok::<(), Box<dyn Error>>(())
    });

    // The manual controller blocks on device reads; don't wait for it.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal (Ctrl+C)"),
        Err(e) => error!("Unable to listen for shutdown signal: {e}"),
    }
}

fn setup_tracing(args: &Args, level: LogLevel) {
    let filter = EnvFilter::from_default_env().add_directive(
        level
            .as_str()
            .parse()
            .unwrap_or_else(|_| tracing::Level::INFO.into()),
    );

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
