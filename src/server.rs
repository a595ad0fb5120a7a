//! HTTP surface: router, shared state and server lifecycle.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State,
    response::Html,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::Settings;
use crate::notify::Notifier;
use crate::render;
use crate::store::BranchStore;
use crate::view::BranchView;
use crate::ws;

/// Process-wide shared state: the branch store and the change notifier.
/// Everything else (changesets, edit targets) lives per connection.
#[derive(Default)]
pub struct AppState {
    pub store: BranchStore,
    pub notifier: Notifier,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build the application router: the live page, its socket, and a probe.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Serve the fully rendered page. The socket takes over once the client
/// script connects; until then the list is plain server-rendered HTML.
async fn index_handler(State(state): State<SharedState>) -> Html<String> {
    let (view, _rx) = BranchView::mount(state.store.clone(), state.notifier.clone()).await;
    Html(render::page(&view))
}

async fn health_handler() -> &'static str {
    "ok"
}

/// Start the branch console server.
pub async fn start_server(settings: Settings) -> Result<()> {
    let state = Arc::new(AppState::new());
    let mut app = build_router(state);

    if settings.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let addr = settings.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    info!(%local_addr, dev_mode = settings.dev_mode, "server listening");
    println!("Cosmos Bank branch console running at http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    println!("Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    println!("\nShutting down...");
}
