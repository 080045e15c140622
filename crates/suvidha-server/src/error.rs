use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use suvidha_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("invalid token id: {0}")]
    InvalidTokenId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Ledger(err) => match err {
                LedgerError::InvalidInput(_) | LedgerError::InvalidRating(_) => {
                    StatusCode::BAD_REQUEST
                }
                LedgerError::AlreadyCertified { .. }
                | LedgerError::ConcurrentModification { .. } => StatusCode::CONFLICT,
                LedgerError::MiningFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
                LedgerError::StorageUnavailable(_)
                | LedgerError::InvalidConfig(_)
                | LedgerError::Serialization(_)
                | LedgerError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidTokenId(_) => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_map_to_statuses() {
        let cases = [
            (LedgerError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (LedgerError::InvalidRating(9), StatusCode::BAD_REQUEST),
            (
                LedgerError::AlreadyCertified { entity_id: "C-1".into() },
                StatusCode::CONFLICT,
            ),
            (
                LedgerError::ConcurrentModification { key: "k".into() },
                StatusCode::CONFLICT,
            ),
            (
                LedgerError::MiningFailed { attempts: 5, difficulty: 9 },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                LedgerError::StorageUnavailable("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).status(), status);
        }
    }

    #[test]
    fn ledger_message_passes_through() {
        let err = ServerError::from(LedgerError::InvalidRating(9));
        assert_eq!(err.to_string(), "rating 9 is outside the 0-5 scale");
    }
}
