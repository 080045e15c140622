use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::SharedLedger;
use crate::router::build_router;

/// SUVIDHA ledger HTTP server.
pub struct SuvidhaServer {
    config: ServerConfig,
    ledger: SharedLedger,
}

impl SuvidhaServer {
    pub fn new(config: ServerConfig, ledger: SharedLedger) -> Self {
        Self { config, ledger }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.ledger.clone(), &self.config)
    }

    /// Serve requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "SUVIDHA server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        tracing::info!("SUVIDHA server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use suvidha_ledger::{Ledger, LedgerConfig};
    use suvidha_store::InMemoryStore;

    fn server() -> SuvidhaServer {
        let ledger = Ledger::open(InMemoryStore::new(), LedgerConfig::default()).unwrap();
        SuvidhaServer::new(ServerConfig::default(), Arc::new(ledger))
    }

    #[test]
    fn server_construction() {
        let server = server();
        assert_eq!(server.config().bind_addr, "127.0.0.1:8787".parse().unwrap());
    }

    #[test]
    fn router_builds() {
        let _router = server().router();
    }
}
