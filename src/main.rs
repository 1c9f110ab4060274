//! Service binary: builds the builtin tool registry and serves the HTTP
//! boundary.
//!
//! Configuration comes from the environment (a local `.env` is honored):
//! - `FLOWGRAPH_ADDR`: bind address, default `127.0.0.1:3000`
//! - `FLOWGRAPH_MAX_STEPS`: per-run step cap, default 1000
//! - `RUST_LOG`: tracing filter, default `info`

use std::net::SocketAddr;

use miette::{IntoDiagnostic, WrapErr};
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

use flowgraph::executor::DEFAULT_MAX_STEPS;
use flowgraph::service::{AppContext, router};
use flowgraph::tools::builtin_registry;

#[tokio::main]
async fn main() -> miette::Result<()> {
    dotenvy::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let max_steps = match std::env::var("FLOWGRAPH_MAX_STEPS") {
        Ok(raw) => raw
            .parse::<u64>()
            .into_diagnostic()
            .wrap_err("FLOWGRAPH_MAX_STEPS must be a positive integer")?,
        Err(_) => DEFAULT_MAX_STEPS,
    };
    let addr: SocketAddr = std::env::var("FLOWGRAPH_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()
        .into_diagnostic()
        .wrap_err("FLOWGRAPH_ADDR must be a socket address")?;

    let ctx = AppContext::new(builtin_registry()).with_max_steps(max_steps);
    let app = router(ctx);

    let listener = TcpListener::bind(addr).await.into_diagnostic()?;
    tracing::info!(%addr, max_steps, "flowgraph service listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("ctrl-c received, shutting down"),
        Err(err) => tracing::warn!(%err, "failed to listen for ctrl-c"),
    }
}
