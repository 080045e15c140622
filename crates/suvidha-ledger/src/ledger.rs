use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use suvidha_crypto::{DigestProvider, ProofOfWork};
use suvidha_store::KeyValueStore;
use suvidha_types::{Action, Clock, Digest, SystemClock};
use tracing::{debug, info, warn};

use crate::certificate::{self, CertificateVerification, MintRequest, Resolution, MINTER_ACTOR};
use crate::config::{ExhaustionPolicy, LedgerConfig};
use crate::error::{LedgerError, LedgerResult};
use crate::query::{self, LedgerStatistics};
use crate::records::{canonical_payload, Block, BlockPayload, Certificate};
use crate::traits::{LedgerReader, LedgerWriter};
use crate::validation::{ChainValidator, VerificationReport};

/// Hash-chained complaint ledger over a key-value store.
///
/// Holds no chain state of its own: every operation loads the full block
/// list from the store, and writes save the whole list back with a version
/// check. Writers on one `Ledger` are serialized by an internal lock;
/// writers on different instances sharing a store are detected through the
/// store's version and fail with `ConcurrentModification`.
pub struct Ledger<S, D = Box<dyn DigestProvider>, C = SystemClock> {
    store: S,
    digest: D,
    clock: C,
    config: LedgerConfig,
    pow: ProofOfWork,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> Ledger<S> {
    /// Open a ledger on `store` using the wall clock and the digest
    /// algorithm named in `config`.
    pub fn open(store: S, config: LedgerConfig) -> LedgerResult<Self> {
        let digest = config.digest.provider();
        Self::with_components(store, digest, SystemClock, config)
    }
}

impl<S, D, C> Ledger<S, D, C>
where
    S: KeyValueStore,
    D: DigestProvider,
    C: Clock,
{
    /// Assemble a ledger from explicit parts. The digest provider wins over
    /// `config.digest`.
    pub fn with_components(
        store: S,
        digest: D,
        clock: C,
        mut config: LedgerConfig,
    ) -> LedgerResult<Self> {
        config.validate()?;
        config.digest = digest.algorithm();
        let pow = config.proof_of_work();
        Ok(Self {
            store,
            digest,
            clock,
            config,
            pow,
            write_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, ()>> {
        self.write_lock.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    fn load_list<T: DeserializeOwned>(&self, key: &str) -> LedgerResult<(Vec<T>, u64)> {
        let Some(stored) = self.store.load(key)? else {
            return Ok((Vec::new(), 0));
        };
        let list = serde_json::from_slice(&stored.value).map_err(|e| {
            warn!(key, error = %e, "persisted list does not parse");
            LedgerError::StorageUnavailable(format!("malformed data under {key}: {e}"))
        })?;
        Ok((list, stored.version))
    }

    fn save_list<T: Serialize>(&self, key: &str, list: &[T], expected: u64) -> LedgerResult<u64> {
        let encoded =
            serde_json::to_vec(list).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(self.store.save_if(key, &encoded, expected)?)
    }

    fn load_chain(&self) -> LedgerResult<(Vec<Block>, u64)> {
        let (chain, version) = self.load_list(&self.config.blocks_key)?;
        debug!(blocks = chain.len(), version, "chain loaded");
        Ok((chain, version))
    }

    fn load_certificates(&self) -> LedgerResult<(Vec<Certificate>, u64)> {
        self.load_list(&self.config.certificates_key)
    }

    fn validator(&self) -> ChainValidator<'_, D> {
        ChainValidator {
            digest: &self.digest,
            pow: self.pow,
        }
    }

    /// Mine and persist one block. Caller must hold the write lock.
    /// Returns the new block and the chain it was appended to.
    fn append_locked(&self, payload: BlockPayload) -> LedgerResult<(Block, Vec<Block>)> {
        let (mut chain, version) = self.load_chain()?;

        let tail = chain.last();
        let previous_digest = tail.map(|b| b.digest).unwrap_or_else(Digest::zero);
        let sequence_number = chain.len() as u64 + 1;
        let now = self.clock.now_millis();
        let created_at_millis = tail.map_or(now, |b| b.created_at_millis.max(now));

        let canonical =
            canonical_payload(&payload, &previous_digest, sequence_number, created_at_millis)?;
        let mined = self.pow.mine(&self.digest, &canonical);

        if !mined.solved {
            match self.config.on_exhaustion {
                ExhaustionPolicy::Fail => {
                    return Err(LedgerError::MiningFailed {
                        attempts: mined.attempts,
                        difficulty: self.pow.difficulty(),
                    });
                }
                ExhaustionPolicy::AcceptBest => {
                    warn!(
                        seq = sequence_number,
                        zeros = mined.digest.leading_zero_nibbles(),
                        "persisting block below proof-of-work target"
                    );
                }
            }
        }

        let block = Block {
            sequence_number,
            digest: mined.digest,
            previous_digest,
            created_at_millis,
            nonce: mined.nonce,
            payload,
        };
        chain.push(block.clone());
        self.save_list(&self.config.blocks_key, &chain, version)?;

        info!(
            seq = block.sequence_number,
            entity = %block.payload.entity_id,
            action = %block.payload.action,
            nonce = block.nonce,
            attempts = mined.attempts,
            digest = %block.digest.short_hex(),
            "block appended"
        );
        Ok((block, chain))
    }
}

fn require_non_blank(field: &str, value: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

impl<S, D, C> LedgerWriter for Ledger<S, D, C>
where
    S: KeyValueStore,
    D: DigestProvider,
    C: Clock,
{
    fn append(
        &self,
        entity_id: &str,
        action: Action,
        actor: &str,
        details: &str,
    ) -> LedgerResult<Block> {
        require_non_blank("entityId", entity_id)?;
        require_non_blank("actor", actor)?;

        let _guard = self.lock()?;
        let payload = BlockPayload {
            entity_id: entity_id.to_string(),
            action,
            actor: actor.to_string(),
            details: details.to_string(),
        };
        self.append_locked(payload).map(|(block, _)| block)
    }

    fn mint(&self, request: &MintRequest) -> LedgerResult<Certificate> {
        request.validate()?;

        let _guard = self.lock()?;
        let (mut certificates, cert_version) = self.load_certificates()?;
        if certificates.iter().any(|c| c.entity_id == request.entity_id) {
            return Err(LedgerError::AlreadyCertified {
                entity_id: request.entity_id.clone(),
            });
        }

        let created_at_millis = self.clock.now_millis();
        let token_id = certificate::token_id(&self.digest, request, created_at_millis)?;
        let token_hex = token_id.to_hex();

        let (block, chain) = self.append_locked(BlockPayload {
            entity_id: request.entity_id.clone(),
            action: Action::Verified,
            actor: MINTER_ACTOR.to_string(),
            details: format!("Resolution certificate minted: {}...", &token_hex[..16]),
        })?;

        let resolution = Resolution::from_history(&chain, &request.entity_id, &block);
        let certificate = Certificate {
            token_id,
            entity_id: request.entity_id.clone(),
            issuer_id: request.issuer_id.clone(),
            recipient_id: request.recipient_id.clone(),
            linked_block_digest: block.digest,
            resolved_at_iso: resolution.resolved_at_iso(),
            resolution_hours: resolution.hours,
            rating: request.rating,
            created_at_millis,
            metadata: request.metadata.clone(),
        };

        certificates.push(certificate.clone());
        if let Err(e) = self.save_list(&self.config.certificates_key, &certificates, cert_version)
        {
            warn!(
                entity = %request.entity_id,
                block = %block.digest.short_hex(),
                error = %e,
                "mint block persisted but certificate was not saved"
            );
            return Err(e);
        }

        info!(
            entity = %certificate.entity_id,
            token = %token_id.short_hex(),
            hours = certificate.resolution_hours,
            rating = certificate.rating,
            "certificate minted"
        );
        Ok(certificate)
    }
}

impl<S, D, C> LedgerReader for Ledger<S, D, C>
where
    S: KeyValueStore,
    D: DigestProvider,
    C: Clock,
{
    fn verify(&self, entity_id: &str) -> LedgerResult<VerificationReport> {
        let (chain, _) = self.load_chain()?;
        let report = self
            .validator()
            .verify_entity(&chain, entity_id, self.config.linkage_scope);
        if !report.valid {
            warn!(
                entity = entity_id,
                violations = report.violations.len(),
                score = report.integrity_score,
                "entity history failed verification"
            );
        }
        Ok(report)
    }

    fn verify_ledger(&self) -> LedgerResult<VerificationReport> {
        let (chain, _) = self.load_chain()?;
        let report = self.validator().verify_chain(&chain);
        if !report.valid {
            warn!(
                violations = report.violations.len(),
                "ledger failed verification"
            );
        }
        Ok(report)
    }

    fn transactions_for(&self, entity_id: &str) -> LedgerResult<Vec<Block>> {
        let (chain, _) = self.load_chain()?;
        Ok(query::filter_entity(chain, entity_id))
    }

    fn all_transactions(&self) -> LedgerResult<Vec<Block>> {
        Ok(self.load_chain()?.0)
    }

    fn statistics(&self) -> LedgerResult<LedgerStatistics> {
        let (chain, _) = self.load_chain()?;
        LedgerStatistics::from_chain(&chain)
    }

    fn verify_certificate(&self, token_id: &Digest) -> LedgerResult<CertificateVerification> {
        let (certificates, _) = self.load_certificates()?;
        let Some(certificate) = certificates.into_iter().find(|c| c.token_id == *token_id) else {
            return Ok(CertificateVerification::not_found());
        };

        let (chain, _) = self.load_chain()?;
        let linked_block = chain
            .into_iter()
            .find(|b| b.digest == certificate.linked_block_digest);

        Ok(CertificateVerification {
            valid: linked_block.is_some(),
            certificate: Some(certificate),
            linked_block,
        })
    }

    fn certificates(&self) -> LedgerResult<Vec<Certificate>> {
        Ok(self.load_certificates()?.0)
    }

    fn certificate_for(&self, entity_id: &str) -> LedgerResult<Option<Certificate>> {
        let (certificates, _) = self.load_certificates()?;
        Ok(certificates.into_iter().find(|c| c.entity_id == entity_id))
    }
}

impl<S, D, C> std::fmt::Debug for Ledger<S, D, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
