//! Append-only complaint ledger for SUVIDHA.
//!
//! This crate is the heart of SUVIDHA. It provides:
//! - `Block` and `Certificate` records with hash-linked integrity
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `Ledger`, which mines, persists and verifies blocks over any store
//! - Resolution certificates anchored to a `VERIFIED` block
//! - Chain verification with per-block violations and an integrity score
//! - Query helpers (per-entity history, statistics, automation rules)

pub mod certificate;
pub mod config;
pub mod error;
pub mod ledger;
pub mod query;
pub mod records;
pub mod rules;
pub mod traits;
pub mod validation;

pub use certificate::{token_id, CertificateVerification, MintRequest, MAX_RATING, MINTER_ACTOR};
pub use config::{ExhaustionPolicy, LedgerConfig, LinkageScope};
pub use error::{LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use query::{filter_entity, LedgerStatistics};
pub use records::{Block, BlockPayload, Certificate};
pub use rules::{fixed_rule_set, AutomationRule};
pub use traits::{LedgerReader, LedgerService, LedgerWriter};
pub use validation::{integrity_score, VerificationReport, Violation, ViolationKind};
