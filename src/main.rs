//! Log Dashboard - live-indexed log directory browser.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use log_dashboard::config::{ConfigError, ConfigLoader, Settings};
use log_dashboard::dashboard::{AppState, DashboardConfig, DashboardServer};
use log_dashboard::service::{LogService, ServiceError};

#[derive(Parser)]
#[command(
    name = "log-dashboard",
    about = "Browse and stream a live-indexed log directory",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (defaults to .log-dashboard.toml, then the user config dir).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Logs directory to index.
    #[arg(short, long)]
    root: Option<String>,

    /// Address to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(root) = &self.root {
            settings.index.root.clone_from(root);
        }
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<(), ServiceError> {
    let loader = cli
        .config
        .clone()
        .map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let mut settings = loader.load_with_env()?;
    cli.apply(&mut settings);

    let base = std::env::current_dir().map_err(|source| ConfigError::RootUnavailable {
        path: PathBuf::from("."),
        source,
    })?;

    let cancel = CancellationToken::new();
    let service = LogService::start(&settings.index, &base, cancel.clone())?;

    let state = AppState::new(service.reader(), cancel.clone())
        .with_stream_interval(settings.server.stream_interval());
    let server = DashboardServer::new(state).with_config(DashboardConfig::from_settings(&settings));
    let listener = server.bind().await?;

    match &settings.server.domain {
        Some(domain) => tracing::info!(
            url = %format!("http://{domain}:{}", settings.server.port),
            root = %service.root().display(),
            "Log dashboard available"
        ),
        None => tracing::info!(
            address = %server.address(),
            root = %service.root().display(),
            "Log dashboard available"
        ),
    }

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl-C, shutting down");
                shutdown.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    let result = server.serve(listener).await;
    cancel.cancel();
    service.shutdown().await;
    result.map_err(ServiceError::from)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Log dashboard failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
