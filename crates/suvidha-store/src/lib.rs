//! Versioned key-value persistence for the SUVIDHA ledger.
//!
//! The ledger keeps two ordered lists (blocks and certificates), each
//! serialized under its own key. This crate never interprets those bytes;
//! it only stores them durably and guards writers with a per-key version.
//!
//! # Storage Backends
//!
//! All backends implement the [`KeyValueStore`] trait:
//!
//! - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileStore`] -- one checksummed file per key, replaced atomically
//!
//! # Design Rules
//!
//! 1. A missing key has version 0; every successful write bumps it by one.
//! 2. `save_if` is a compare-and-swap: it fails with
//!    [`StoreError::Conflict`] instead of overwriting a newer value.
//! 3. Corrupt data is reported, never read back as "empty".
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use traits::{validate_key, KeyValueStore, Versioned};
