//! Web dashboard serving the live log index.

mod api;
mod auth;
mod error;
mod handlers;
mod render;
mod server;
mod state;

pub use api::{FileQuery, StatsResponse};
pub use auth::{require_basic_auth, BasicAuth};
pub use error::{ApiError, DashboardError};
pub use handlers::{
    get_dashboard, get_download, get_files, get_stats, get_stream, get_tree, get_view,
    redirect_root,
};
pub use render::{escape_html, file_link, render_dashboard, render_file_view};
pub use server::{DashboardConfig, DashboardServer, DEFAULT_PORT};
pub use state::{AppState, DEFAULT_STREAM_INTERVAL};
