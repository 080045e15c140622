use std::fmt::Write as _;

use suvidha_types::Digest;
use tracing::{debug, warn};

use crate::digest::DigestProvider;

/// Leading-zero proof-of-work over a payload string.
///
/// A candidate is `payload` followed by the decimal nonce; it is accepted
/// when the hex digest starts with `difficulty` `'0'` characters. The search
/// gives up after `max_attempts` candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
    max_attempts: u64,
}

/// Outcome of a nonce search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MiningResult {
    pub nonce: u64,
    pub digest: Digest,
    /// Candidates digested, including the returned one.
    pub attempts: u64,
    /// `false` when the attempt cap was hit; `nonce`/`digest` are then the
    /// candidate with the most leading zeros seen.
    pub solved: bool,
}

impl ProofOfWork {
    pub const DEFAULT_DIFFICULTY: u32 = 2;
    pub const DEFAULT_MAX_ATTEMPTS: u64 = 50_000;

    /// Difficulty is capped at the hex length of a digest and at least one
    /// attempt is always made.
    pub fn new(difficulty: u32, max_attempts: u64) -> Self {
        Self {
            difficulty: difficulty.min(Digest::HEX_LEN as u32),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn max_attempts(&self) -> u64 {
        self.max_attempts
    }

    /// Whether a digest meets this target.
    pub fn is_satisfied(&self, digest: &Digest) -> bool {
        digest.meets_difficulty(self.difficulty)
    }

    /// Digest of `payload` sealed with `nonce`.
    pub fn seal<D: DigestProvider + ?Sized>(provider: &D, payload: &str, nonce: u64) -> Digest {
        let mut candidate = String::with_capacity(payload.len() + 20);
        candidate.push_str(payload);
        let _ = write!(candidate, "{nonce}");
        provider.digest_str(&candidate)
    }

    /// Search nonces 1, 2, 3, … until the target is met or the cap is hit.
    pub fn mine<D: DigestProvider + ?Sized>(&self, provider: &D, payload: &str) -> MiningResult {
        let mut candidate = String::with_capacity(payload.len() + 20);
        let mut best: Option<(u64, Digest)> = None;
        let mut nonce = 0u64;

        while nonce < self.max_attempts {
            nonce += 1;
            candidate.clear();
            candidate.push_str(payload);
            let _ = write!(candidate, "{nonce}");
            let digest = provider.digest_str(&candidate);

            if self.is_satisfied(&digest) {
                debug!(nonce, difficulty = self.difficulty, "proof-of-work solved");
                return MiningResult {
                    nonce,
                    digest,
                    attempts: nonce,
                    solved: true,
                };
            }

            let improves = best
                .map(|(_, b)| digest.leading_zero_nibbles() > b.leading_zero_nibbles())
                .unwrap_or(true);
            if improves {
                best = Some((nonce, digest));
            }
        }

        let (nonce, digest) = best.unwrap_or_else(|| (1, Self::seal(provider, payload, 1)));
        warn!(
            attempts = self.max_attempts,
            difficulty = self.difficulty,
            best_zeros = digest.leading_zero_nibbles(),
            "proof-of-work attempt cap reached"
        );
        MiningResult {
            nonce,
            digest,
            attempts: self.max_attempts,
            solved: false,
        }
    }
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIFFICULTY, Self::DEFAULT_MAX_ATTEMPTS)
    }
}
