//! Cryptographic primitives for the SUVIDHA ledger.
//!
//! Provides pluggable digest providers (SHA-256 by default, BLAKE3 as an
//! equal-strength alternative), the proof-of-work nonce search used when
//! sealing blocks, and hash-chain linkage checks.
//!
//! All hashing wraps established libraries; there is no custom cryptography.

pub mod chain;
pub mod digest;
pub mod pow;

pub use chain::{ChainLink, HashChainVerifier, LinkBreak};
pub use digest::{Blake3Digest, DigestAlgorithm, DigestError, DigestProvider, Sha256Digest};
pub use pow::{MiningResult, ProofOfWork};
