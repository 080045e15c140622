use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use suvidha_crypto::{ChainLink, DigestProvider, ProofOfWork};
use suvidha_types::{Action, Digest};

use crate::error::{LedgerError, LedgerResult};

/// What happened to which complaint, and who did it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPayload {
    pub entity_id: String,
    pub action: Action,
    pub actor: String,
    pub details: String,
}

/// One immutable, hash-linked ledger record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// 1-based position in the global chain.
    pub sequence_number: u64,
    /// Digest of the canonical payload followed by the decimal nonce.
    pub digest: Digest,
    /// Digest of the previous block; zero for genesis.
    pub previous_digest: Digest,
    pub created_at_millis: u64,
    pub nonce: u64,
    pub payload: BlockPayload,
}

/// Canonical form that gets digested. Field order is part of the format.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalPayload<'a> {
    entity_id: &'a str,
    action: Action,
    actor: &'a str,
    details: &'a str,
    previous_digest: &'a Digest,
    sequence_number: u64,
    created_at_millis: u64,
}

/// Canonical JSON string for a block that is about to be mined.
pub(crate) fn canonical_payload(
    payload: &BlockPayload,
    previous_digest: &Digest,
    sequence_number: u64,
    created_at_millis: u64,
) -> LedgerResult<String> {
    let canonical = CanonicalPayload {
        entity_id: &payload.entity_id,
        action: payload.action,
        actor: &payload.actor,
        details: &payload.details,
        previous_digest,
        sequence_number,
        created_at_millis,
    };
    serde_json::to_string(&canonical).map_err(|e| LedgerError::Serialization(e.to_string()))
}

impl Block {
    /// The canonical JSON this block's digest was mined over.
    pub fn canonical_payload(&self) -> LedgerResult<String> {
        canonical_payload(
            &self.payload,
            &self.previous_digest,
            self.sequence_number,
            self.created_at_millis,
        )
    }

    /// Digest recomputed from the block's current contents.
    pub fn recompute_digest<D: DigestProvider + ?Sized>(&self, provider: &D) -> LedgerResult<Digest> {
        let canonical = self.canonical_payload()?;
        Ok(ProofOfWork::seal(provider, &canonical, self.nonce))
    }

    pub fn entity_id(&self) -> &str {
        &self.payload.entity_id
    }

    pub fn action(&self) -> Action {
        self.payload.action
    }

    pub fn is_genesis(&self) -> bool {
        self.sequence_number == 1
    }
}

impl ChainLink for Block {
    fn digest(&self) -> Digest {
        self.digest
    }

    fn previous_digest(&self) -> Digest {
        self.previous_digest
    }
}

/// Resolution certificate for one complaint, anchored to the ledger block
/// that recorded its minting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Digest of the identity tuple; see `certificate::token_id`.
    pub token_id: Digest,
    pub entity_id: String,
    /// Who the certificate is issued by (the citizen).
    pub issuer_id: String,
    /// Who receives credit (the department).
    pub recipient_id: String,
    pub linked_block_digest: Digest,
    /// RFC 3339 UTC time the complaint was resolved.
    pub resolved_at_iso: String,
    /// Hours from the complaint's first block to its resolution.
    pub resolution_hours: f64,
    /// Citizen rating, 0-5.
    pub rating: u8,
    pub created_at_millis: u64,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}
