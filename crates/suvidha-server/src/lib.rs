//! HTTP server for the SUVIDHA ledger.
//!
//! Exposes append, verification, queries and certificate minting as a JSON
//! API. Handlers add no ledger semantics; every route calls one ledger
//! operation on the blocking pool and maps its error to a status code.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{AppState, AppendRequest, SharedLedger};
pub use router::build_router;
pub use server::SuvidhaServer;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use suvidha_ledger::{Ledger, LedgerConfig};
    use suvidha_store::InMemoryStore;
    use tower::util::ServiceExt;

    use super::*;

    fn app_with(config: LedgerConfig) -> Router {
        let ledger = Ledger::open(InMemoryStore::new(), config).unwrap();
        build_router(Arc::new(ledger), &ServerConfig::default())
    }

    fn app() -> Router {
        app_with(LedgerConfig::default())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn append(app: &Router, entity: &str, action: &str) -> Value {
        let (status, block) = send(
            app,
            Method::POST,
            "/v1/blocks",
            Some(json!({"entityId": entity, "action": action, "actor": "citizen", "details": "d"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        block
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = send(&app(), Method::GET, "/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn append_then_query_and_verify() {
        let app = app();
        let first = append(&app, "C-100", "CREATED").await;
        assert_eq!(first["sequenceNumber"], 1);
        assert_eq!(first["previousDigest"], "0".repeat(64));
        assert!(first["digest"].as_str().unwrap().starts_with("00"));
        append(&app, "C-200", "CREATED").await;
        append(&app, "C-100", "RESOLVED").await;

        let (status, blocks) = send(&app, Method::GET, "/v1/entities/C-100/blocks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(blocks.as_array().unwrap().len(), 2);

        let (_, report) = send(&app, Method::GET, "/v1/entities/C-100/verify", None).await;
        assert_eq!(report["valid"], true);
        assert_eq!(report["integrityScore"], 100);
        assert_eq!(report["latestSequenceNumber"], 3);

        let (_, report) = send(&app, Method::GET, "/v1/verify", None).await;
        assert_eq!(report["blockCount"], 3);

        let (_, all) = send(&app, Method::GET, "/v1/blocks", None).await;
        assert_eq!(all.as_array().unwrap().len(), 3);

        let (_, stats) = send(&app, Method::GET, "/v1/stats", None).await;
        assert_eq!(stats["totalBlocks"], 3);
        assert_eq!(stats["distinctEntities"], 2);
    }

    #[tokio::test]
    async fn blank_entity_is_bad_request() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/v1/blocks",
            Some(json!({"entityId": " ", "action": "CREATED", "actor": "citizen"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("entityId"));
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let (status, _) = send(
            &app(),
            Method::POST,
            "/v1/blocks",
            Some(json!({"entityId": "C-1", "action": "DELETED", "actor": "citizen"})),
        )
        .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn exhausted_mining_is_service_unavailable() {
        let app = app_with(LedgerConfig {
            difficulty: 64,
            max_attempts: 5,
            ..LedgerConfig::default()
        });
        let (status, body) = send(
            &app,
            Method::POST,
            "/v1/blocks",
            Some(json!({"entityId": "C-1", "action": "CREATED", "actor": "citizen"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("mining failed"));
    }

    #[tokio::test]
    async fn mint_and_verify_certificate() {
        let app = app();
        append(&app, "C-100", "CREATED").await;
        append(&app, "C-100", "RESOLVED").await;

        let (status, certificate) = send(
            &app,
            Method::POST,
            "/v1/certificates",
            Some(json!({"entityId": "C-100", "rating": 5, "metadata": {"ward": 12}})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(certificate["issuerId"], "citizen");
        assert_eq!(certificate["metadata"]["ward"], 12);

        let token = certificate["tokenId"].as_str().unwrap();
        let (status, verification) =
            send(&app, Method::GET, &format!("/v1/certificates/{token}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(verification["valid"], true);
        assert_eq!(
            verification["linkedBlock"]["digest"],
            certificate["linkedBlockDigest"]
        );

        let (status, _) = send(
            &app,
            Method::POST,
            "/v1/certificates",
            Some(json!({"entityId": "C-100", "rating": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, listed) = send(&app, Method::GET, "/v1/certificates", None).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn out_of_scale_rating_is_bad_request() {
        let (status, _) = send(
            &app(),
            Method::POST,
            "/v1/certificates",
            Some(json!({"entityId": "C-1", "rating": 7})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn certificate_lookup_by_token() {
        let app = app();
        let (status, verification) = send(
            &app,
            Method::GET,
            &format!("/v1/certificates/{}", "ab".repeat(32)),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(verification["valid"], false);
        assert_eq!(verification["certificate"], Value::Null);

        let (status, _) = send(&app, Method::GET, "/v1/certificates/not-hex", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rules_are_listed() {
        let (status, rules) = send(&app(), Method::GET, "/v1/rules", None).await;
        assert_eq!(status, StatusCode::OK);
        let rules = rules.as_array().unwrap();
        assert_eq!(rules.len(), 5);
        assert!(rules.iter().any(|r| r["id"] == "escalate-stale-pending"));
    }
}
