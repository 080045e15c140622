//! Foundation types for the SUVIDHA complaint ledger.
//!
//! Every other SUVIDHA crate depends on `suvidha-types`.
//!
//! # Key Types
//!
//! - [`Digest`]: 32-byte hash rendered as lowercase hex
//! - [`Action`]: fixed vocabulary of complaint lifecycle events
//! - [`Clock`]: millisecond wall-clock source, swappable in tests

pub mod action;
pub mod digest;
pub mod error;
pub mod temporal;

pub use action::Action;
pub use digest::Digest;
pub use error::TypeError;
pub use temporal::{Clock, ManualClock, SystemClock};
