use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use suvidha_ledger::{
    fixed_rule_set, AutomationRule, Block, Certificate, CertificateVerification, LedgerResult,
    LedgerReader, LedgerService, LedgerStatistics, LedgerWriter, MintRequest, VerificationReport,
};
use suvidha_types::{Action, Digest};

use crate::error::{ServerError, ServerResult};

/// Ledger shared by every request.
pub type SharedLedger = Arc<dyn LedgerService>;

#[derive(Clone)]
pub struct AppState {
    pub ledger: SharedLedger,
}

/// Body of `POST /v1/blocks`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendRequest {
    pub entity_id: String,
    pub action: Action,
    pub actor: String,
    #[serde(default)]
    pub details: String,
}

/// Run a ledger call on the blocking pool; mining and file I/O never run
/// on the async workers.
async fn run<T, F>(state: &AppState, op: F) -> ServerResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn LedgerService) -> LedgerResult<T> + Send + 'static,
{
    let ledger = Arc::clone(&state.ledger);
    let result = tokio::task::spawn_blocking(move || op(ledger.as_ref()))
        .await
        .map_err(|e| ServerError::Internal(format!("ledger task failed: {e}")))?;
    Ok(result?)
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": "suvidha-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn list_blocks(State(state): State<AppState>) -> ServerResult<Json<Vec<Block>>> {
    run(&state, |ledger| ledger.all_transactions()).await.map(Json)
}

pub async fn append_block(
    State(state): State<AppState>,
    Json(request): Json<AppendRequest>,
) -> ServerResult<(StatusCode, Json<Block>)> {
    let block = run(&state, move |ledger| {
        ledger.append(
            &request.entity_id,
            request.action,
            &request.actor,
            &request.details,
        )
    })
    .await?;
    Ok((StatusCode::CREATED, Json(block)))
}

pub async fn entity_blocks(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> ServerResult<Json<Vec<Block>>> {
    run(&state, move |ledger| ledger.transactions_for(&entity_id))
        .await
        .map(Json)
}

pub async fn verify_entity(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> ServerResult<Json<VerificationReport>> {
    run(&state, move |ledger| ledger.verify(&entity_id))
        .await
        .map(Json)
}

pub async fn verify_ledger(
    State(state): State<AppState>,
) -> ServerResult<Json<VerificationReport>> {
    run(&state, |ledger| ledger.verify_ledger()).await.map(Json)
}

pub async fn statistics(State(state): State<AppState>) -> ServerResult<Json<LedgerStatistics>> {
    run(&state, |ledger| ledger.statistics()).await.map(Json)
}

pub async fn rules() -> Json<&'static [AutomationRule]> {
    Json(fixed_rule_set())
}

pub async fn list_certificates(
    State(state): State<AppState>,
) -> ServerResult<Json<Vec<Certificate>>> {
    run(&state, |ledger| ledger.certificates()).await.map(Json)
}

pub async fn mint_certificate(
    State(state): State<AppState>,
    Json(request): Json<MintRequest>,
) -> ServerResult<(StatusCode, Json<Certificate>)> {
    let certificate = run(&state, move |ledger| ledger.mint(&request)).await?;
    Ok((StatusCode::CREATED, Json(certificate)))
}

pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
) -> ServerResult<Json<CertificateVerification>> {
    let token: Digest = token_id
        .parse()
        .map_err(|e| ServerError::InvalidTokenId(format!("{token_id}: {e}")))?;
    run(&state, move |ledger| ledger.verify_certificate(&token))
        .await
        .map(Json)
}
