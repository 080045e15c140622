use suvidha_types::{Action, Digest};

use crate::certificate::{CertificateVerification, MintRequest};
use crate::error::LedgerError;
use crate::query::LedgerStatistics;
use crate::records::{Block, Certificate};
use crate::validation::VerificationReport;

/// Write boundary of the ledger.
pub trait LedgerWriter: Send + Sync {
    /// Mine and persist a block recording `action` on `entity_id`.
    fn append(
        &self,
        entity_id: &str,
        action: Action,
        actor: &str,
        details: &str,
    ) -> Result<Block, LedgerError>;

    /// Mint the resolution certificate for an entity.
    fn mint(&self, request: &MintRequest) -> Result<Certificate, LedgerError>;
}

/// Read boundary of the ledger.
pub trait LedgerReader: Send + Sync {
    fn verify(&self, entity_id: &str) -> Result<VerificationReport, LedgerError>;

    fn verify_ledger(&self) -> Result<VerificationReport, LedgerError>;

    fn transactions_for(&self, entity_id: &str) -> Result<Vec<Block>, LedgerError>;

    fn all_transactions(&self) -> Result<Vec<Block>, LedgerError>;

    fn statistics(&self) -> Result<LedgerStatistics, LedgerError>;

    fn verify_certificate(&self, token_id: &Digest)
        -> Result<CertificateVerification, LedgerError>;

    fn certificates(&self) -> Result<Vec<Certificate>, LedgerError>;

    fn certificate_for(&self, entity_id: &str) -> Result<Option<Certificate>, LedgerError>;
}

/// Both boundaries, usable as a trait object.
pub trait LedgerService: LedgerReader + LedgerWriter {}

impl<T: LedgerReader + LedgerWriter> LedgerService for T {}
