use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler::{self, AppState, SharedLedger};

/// Build the axum router with all SUVIDHA endpoints.
pub fn build_router(ledger: SharedLedger, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route(
            "/v1/blocks",
            get(handler::list_blocks).post(handler::append_block),
        )
        .route("/v1/entities/:entity_id/blocks", get(handler::entity_blocks))
        .route("/v1/entities/:entity_id/verify", get(handler::verify_entity))
        .route("/v1/verify", get(handler::verify_ledger))
        .route("/v1/stats", get(handler::statistics))
        .route("/v1/rules", get(handler::rules))
        .route(
            "/v1/certificates",
            get(handler::list_certificates).post(handler::mint_certificate),
        )
        .route(
            "/v1/certificates/:token_id",
            get(handler::verify_certificate),
        )
        .with_state(AppState { ledger })
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    if config.permissive_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
