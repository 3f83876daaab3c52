//! Dataset server for hourglass plabic graphs: a named document store
//! behind the applet HTTP API.

mod config;
mod error;
mod routes;
mod sse;
mod state;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use clap::Parser;
use hpg_store::{FsBackend, Store};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::config::{DEFAULT_CONFIG_FILE, ServerConfig, load_config};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "hpg-server")]
#[command(about = "Serve hourglass plabic graph datasets to the web applets")]
struct Args {
    /// Config file (TOML). Missing file means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Address to bind the server to
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding the dataset files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory containing the applet UI files
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl Args {
    /// Command-line values take precedence over the config file.
    fn apply(self, mut cfg: ServerConfig) -> ServerConfig {
        if let Some(bind) = self.bind {
            cfg.bind = bind;
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(data_dir) = self.data_dir {
            cfg.data_dir = data_dir;
        }
        if self.static_dir.is_some() {
            cfg.static_dir = self.static_dir;
        }
        cfg
    }
}

/// API routes, the change feed, and the applet files when `static_dir`
/// exists.
fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = routes::api_router()
        .route("/events", get(sse::events_handler))
        .layer(cors)
        .with_state(state);

    match static_dir {
        Some(dir) if dir.is_dir() => {
            info!(static_dir = %dir.display(), "serving applet files");
            app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
        }
        Some(dir) => {
            warn!(static_dir = %dir.display(), "static directory not found, API-only mode");
        }
        None => info!("no static directory configured, API-only mode"),
    }
    app
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hpg_store::logging::init();

    let args = Args::parse();
    let cfg = load_config(&args.config)?;
    let cfg = args.apply(cfg);
    cfg.validate()?;

    info!(data_dir = %cfg.data_dir.display(), "starting hpg-server");
    let backend = FsBackend::open(&cfg.data_dir)
        .with_context(|| format!("open data directory {}", cfg.data_dir.display()))?;
    let store = Store::open(backend).context("load datasets")?;
    let skipped = &store.load_report().skipped;
    if !skipped.is_empty() {
        warn!(count = skipped.len(), names = ?skipped, "some datasets could not be loaded");
    }

    let state = AppState::new(Arc::new(store), cfg.event_buffer);
    let app = build_router(state, cfg.static_dir.as_deref());

    let addr = cfg.addr()?;
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
