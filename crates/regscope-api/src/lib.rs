//! HTTP surface for regscope
//!
//! Extract, keyword and summary CRUD, the catalog functions under
//! `/api/mcp/*` and the research workflow under `/api/ai/chat`.

pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use regscope_core::Services;
use tokio::net::TcpListener;

use crate::state::AppState;

/// Bind `addr` and serve until the process is stopped
pub async fn serve(services: Arc<Services>, addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", addr))?;
    let app = routes::router(AppState::new(services));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening.");
    axum::serve(listener, app).await?;
    Ok(())
}
