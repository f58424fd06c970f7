//! Serve command - run the HTTP server until Ctrl-C

use std::sync::Arc;

use anyhow::Result;

use super::get_context;
use crate::output;

pub async fn run(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut ctx = get_context()?;
    if let Some(host) = host {
        ctx.config.server.host = host;
    }
    if let Some(port) = port {
        ctx.config.server.port = port;
    }

    let addr = ctx.config.server.addr();
    if ctx.config.demo_mode {
        output::info("Demo mode is on: using the offline demo API");
    }

    finsync_server::serve(Arc::new(ctx), &addr, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
