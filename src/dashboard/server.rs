//! Dashboard HTTP server with axum router and graceful shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::auth::{require_basic_auth, BasicAuth};
use super::error::DashboardError;
use super::handlers::{
    get_dashboard, get_download, get_files, get_stats, get_stream, get_tree, get_view,
    redirect_root,
};
use super::state::AppState;
use crate::config::Settings;

/// Default port for the dashboard server.
pub const DEFAULT_PORT: u16 = 3001;

/// Configuration for the dashboard server.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Port to listen on.
    pub port: u16,
    /// Host address to bind to.
    pub host: String,
    /// Whether to enable permissive CORS.
    pub cors_permissive: bool,
    /// Static directory served under `/assets`.
    pub assets_dir: Option<PathBuf>,
    /// Basic-auth credentials; `None` leaves the dashboard open.
    pub auth: Option<BasicAuth>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: "0.0.0.0".to_string(),
            cors_permissive: false,
            assets_dir: None,
            auth: None,
        }
    }
}

impl DashboardConfig {
    /// Build from loaded settings.
    ///
    /// A relative `assets_dir` is resolved against the working directory
    /// when the server starts.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            port: settings.server.port,
            host: settings.server.host.clone(),
            cors_permissive: settings.server.cors_permissive,
            assets_dir: settings.server.assets_dir.as_ref().map(PathBuf::from),
            auth: BasicAuth::from_settings(&settings.auth),
        }
    }
}

/// Dashboard HTTP server exposing the live index.
pub struct DashboardServer {
    /// Server configuration.
    config: DashboardConfig,
    /// Application state shared across handlers.
    state: AppState,
}

impl DashboardServer {
    /// Create a new dashboard server with default configuration.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        Self {
            config: DashboardConfig::default(),
            state,
        }
    }

    /// Set the server configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: DashboardConfig) -> Self {
        self.state = self.state.with_assets(config.assets_dir.is_some());
        self.config = config;
        self
    }

    /// Get the configured address as a string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Build the axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/", get(redirect_root))
            .route("/logs", get(get_dashboard))
            .route("/logs/view", get(get_view))
            .route("/logs/download", get(get_download))
            .route("/logs/stream", get(get_stream))
            .route("/api/tree", get(get_tree))
            .route("/api/files", get(get_files))
            .route("/api/stats", get(get_stats))
            .with_state(self.state.clone());

        if let Some(dir) = &self.config.assets_dir {
            router = router.nest_service("/assets", ServeDir::new(dir));
        }

        if let Some(auth) = &self.config.auth {
            router = router.layer(middleware::from_fn_with_state(
                Arc::new(auth.clone()),
                require_basic_auth,
            ));
        }

        let router = router.layer(TraceLayer::new_for_http());

        if self.config.cors_permissive {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Bind to the configured address.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::BindError`] if the address is unavailable.
    pub async fn bind(&self) -> Result<TcpListener, DashboardError> {
        let address = self.address();
        TcpListener::bind(&address)
            .await
            .map_err(|source| DashboardError::BindError { address, source })
    }

    /// Run the server, binding to the configured address.
    ///
    /// The server will run until the cancellation token is triggered,
    /// at which point it will perform a graceful shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or serve.
    pub async fn run(self) -> Result<(), DashboardError> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::ServerError`] if serving fails.
    pub async fn serve(self, listener: TcpListener) -> Result<(), DashboardError> {
        let cancel = self.state.cancel.clone();
        let app = self.build_router();

        match listener.local_addr() {
            Ok(addr) => tracing::info!(address = %addr, "Starting dashboard server"),
            Err(_) => tracing::info!(address = %self.address(), "Starting dashboard server"),
        }
        if self.config.auth.is_none() {
            tracing::warn!("No password configured, dashboard is not protected");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel.cancelled().await;
                tracing::info!("Dashboard server shutting down gracefully");
            })
            .await
            .map_err(|e| DashboardError::ServerError(e.to_string()))
    }
}
