use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use suvidha_crypto::DigestProvider;
use suvidha_types::{Action, Digest};

use crate::error::{LedgerError, LedgerResult};
use crate::records::{Block, Certificate};

/// Actor recorded on the `VERIFIED` block that anchors a mint.
pub const MINTER_ACTOR: &str = "nft_minter";

/// Kind tag hashed into every token id.
pub const CERTIFICATE_KIND: &str = "resolution_certificate";

/// Version tag hashed into every token id.
pub const CERTIFICATE_VERSION: u32 = 1;

/// Highest allowed citizen rating.
pub const MAX_RATING: u8 = 5;

/// Input to `mint`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub entity_id: String,
    #[serde(default = "default_issuer")]
    pub issuer_id: String,
    #[serde(default = "default_recipient")]
    pub recipient_id: String,
    /// Citizen rating of the resolution, 0-5.
    pub rating: u8,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

fn default_issuer() -> String {
    "citizen".into()
}

fn default_recipient() -> String {
    "department".into()
}

impl MintRequest {
    /// A request with the default citizen issuer and department recipient.
    pub fn new(entity_id: impl Into<String>, rating: u8) -> Self {
        Self {
            entity_id: entity_id.into(),
            issuer_id: default_issuer(),
            recipient_id: default_recipient(),
            rating,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub(crate) fn validate(&self) -> LedgerResult<()> {
        for (field, value) in [
            ("entityId", &self.entity_id),
            ("issuerId", &self.issuer_id),
            ("recipientId", &self.recipient_id),
        ] {
            if value.trim().is_empty() {
                return Err(LedgerError::InvalidInput(format!("{field} must not be empty")));
            }
        }
        if self.rating > MAX_RATING {
            return Err(LedgerError::InvalidRating(self.rating));
        }
        Ok(())
    }
}

/// Result of `verify_certificate`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateVerification {
    pub valid: bool,
    pub certificate: Option<Certificate>,
    pub linked_block: Option<Block>,
}

impl CertificateVerification {
    pub(crate) fn not_found() -> Self {
        Self {
            valid: false,
            certificate: None,
            linked_block: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenIdentity<'a> {
    entity_id: &'a str,
    issuer_id: &'a str,
    recipient_id: &'a str,
    created_at_millis: u64,
    kind: &'static str,
    version: u32,
}

/// Token id for a certificate minted at `created_at_millis`.
///
/// Deterministic: the same request at the same millisecond yields the same
/// id, so the timestamp is part of the certificate's identity.
pub fn token_id<D: DigestProvider>(
    provider: &D,
    request: &MintRequest,
    created_at_millis: u64,
) -> LedgerResult<Digest> {
    let identity = TokenIdentity {
        entity_id: &request.entity_id,
        issuer_id: &request.issuer_id,
        recipient_id: &request.recipient_id,
        created_at_millis,
        kind: CERTIFICATE_KIND,
        version: CERTIFICATE_VERSION,
    };
    provider
        .digest_json(&identity)
        .map_err(|e| LedgerError::Serialization(e.to_string()))
}

/// When and how fast a complaint was resolved, read off its history.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Resolution {
    pub resolved_at_millis: u64,
    pub hours: f64,
}

impl Resolution {
    /// Measured from the entity's first block to its latest `RESOLVED`
    /// block, or to `fallback` (the mint block) when it was never resolved.
    pub fn from_history(chain: &[Block], entity_id: &str, fallback: &Block) -> Self {
        let mut history = chain.iter().filter(|b| b.entity_id() == entity_id);
        let opened_at = history
            .next()
            .map(|b| b.created_at_millis)
            .unwrap_or(fallback.created_at_millis);
        let resolved_at = chain
            .iter()
            .filter(|b| b.entity_id() == entity_id && b.action() == Action::Resolved)
            .last()
            .map(|b| b.created_at_millis)
            .unwrap_or(fallback.created_at_millis);

        let elapsed_ms = resolved_at.saturating_sub(opened_at) as f64;
        Self {
            resolved_at_millis: resolved_at,
            hours: (elapsed_ms / 360_000.0).round() / 10.0,
        }
    }

    pub fn resolved_at_iso(&self) -> String {
        i64::try_from(self.resolved_at_millis)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default()
    }
}
