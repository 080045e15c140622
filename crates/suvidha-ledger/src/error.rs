use suvidha_store::StoreError;

/// Errors produced by ledger operations.
///
/// Integrity problems found by `verify` are not errors; they are reported
/// as violations in a `VerificationReport`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The persistence backend failed or returned data that does not parse.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Another writer saved the list between our load and save.
    #[error("concurrent modification of {key}; reload and retry")]
    ConcurrentModification { key: String },

    #[error("mining failed: no digest with {difficulty} leading zeros after {attempts} attempts")]
    MiningFailed { attempts: u64, difficulty: u32 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("rating {0} is outside the 0-5 scale")]
    InvalidRating(u8),

    #[error("entity {entity_id} already has a resolution certificate")]
    AlreadyCertified { entity_id: String },

    #[error("invalid ledger configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger write lock poisoned")]
    LockPoisoned,
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { key, .. } => Self::ConcurrentModification { key },
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
