// [apps/gateway/src/main.rs]
//! Process entry point: hydrate `.env`, init tracing, parse config,
//! ignite the kernel, serve.

use clap::Parser;
use dotenvy::dotenv;
use gateway::prelude::*;
use gateway_shared_telemetry::init_tracing;
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("gateway");

    let config = GatewayConfig::parse();

    let kernel = Kernel::ignite(&config).await.map_err(|e| {
        error!(error = %e, "failed to ignite gateway");
        e
    })?;

    kernel.serve().await.map_err(|e| {
        error!(error = %e, "gateway terminated");
        e
    })?;

    Ok(())
}
