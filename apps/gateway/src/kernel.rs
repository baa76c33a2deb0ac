// [apps/gateway/src/kernel.rs]
//! Composition root: builds the application state and binds the HTTP
//! listener. Kept separate from `main.rs` so integration tests can
//! `Kernel::ignite` against an in-memory store without going through
//! process argv.

use crate::config::GatewayConfig;
use crate::routes::build_router;
use crate::state::AppState;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

pub struct Kernel {
    bind_address: SocketAddr,
    state: AppState,
    cors_origins: Vec<String>,
}

impl Kernel {
    pub async fn ignite(config: &GatewayConfig) -> anyhow::Result<Self> {
        let state = AppState::bootstrap(config).await?;
        Ok(Self {
            bind_address: SocketAddr::new(config.host, config.port),
            state,
            cors_origins: config.cors_origins.clone(),
        })
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let router = build_router(self.state, &self.cors_origins).layer(CatchPanicLayer::new());

        let listener = tokio::net::TcpListener::bind(self.bind_address).await?;
        info!(address = %self.bind_address, "gateway listening");

        axum::serve(listener, router).await?;
        Ok(())
    }
}
