use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use suvidha_crypto::{DigestProvider, HashChainVerifier, LinkBreak, ProofOfWork};

use crate::config::LinkageScope;
use crate::records::Block;

/// Result of verifying one entity's history, or the whole chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    /// `None` when the whole chain was verified.
    pub entity_id: Option<String>,
    pub valid: bool,
    pub block_count: u64,
    pub latest_sequence_number: Option<u64>,
    pub latest_timestamp: Option<u64>,
    /// 100 when valid, otherwise `max(0, 100 - 10 * block_count)`.
    pub integrity_score: u8,
    pub scope: LinkageScope,
    pub violations: Vec<Violation>,
}

/// A specific integrity violation found during verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub sequence_number: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// `previous_digest` does not name the expected predecessor.
    BrokenLink,
    /// Sequence number differs from the block's position in the chain.
    SequenceGap,
    /// Stored digest differs from the one recomputed from the contents.
    DigestMismatch,
    /// Digest does not meet the proof-of-work target.
    InsufficientWork,
}

/// Crude penalty: any failure costs ten points per block checked.
pub fn integrity_score(valid: bool, block_count: u64) -> u8 {
    if valid {
        100
    } else {
        100u64.saturating_sub(block_count.saturating_mul(10)) as u8
    }
}

/// Chain verifier parameterised by digest, work target and linkage scope.
pub(crate) struct ChainValidator<'a, D: DigestProvider + ?Sized> {
    pub digest: &'a D,
    pub pow: ProofOfWork,
}

impl<D: DigestProvider + ?Sized> ChainValidator<'_, D> {
    /// Verify the blocks of one entity inside `chain`.
    pub fn verify_entity(
        &self,
        chain: &[Block],
        entity_id: &str,
        scope: LinkageScope,
    ) -> VerificationReport {
        let matched: Vec<(usize, &Block)> = chain
            .iter()
            .enumerate()
            .filter(|(_, block)| block.entity_id() == entity_id)
            .collect();

        let breaks: HashMap<usize, LinkBreak> = match scope {
            LinkageScope::Global => HashChainVerifier::link_breaks(chain, true)
                .into_iter()
                .map(|brk| (brk.index, brk))
                .collect(),
            LinkageScope::Entity => {
                let subsequence: Vec<&Block> = matched.iter().map(|(_, block)| *block).collect();
                HashChainVerifier::link_breaks(&subsequence, false)
                    .into_iter()
                    .map(|brk| (matched[brk.index].0, brk))
                    .collect()
            }
        };

        let violations = self.check(&matched, &breaks, scope == LinkageScope::Global);
        report(Some(entity_id.to_string()), &matched, scope, violations)
    }

    /// Verify every block of `chain` in global scope.
    pub fn verify_chain(&self, chain: &[Block]) -> VerificationReport {
        let matched: Vec<(usize, &Block)> = chain.iter().enumerate().collect();
        let breaks: HashMap<usize, LinkBreak> = HashChainVerifier::link_breaks(chain, true)
            .into_iter()
            .map(|brk| (brk.index, brk))
            .collect();

        let violations = self.check(&matched, &breaks, true);
        report(None, &matched, LinkageScope::Global, violations)
    }

    fn check(
        &self,
        matched: &[(usize, &Block)],
        breaks: &HashMap<usize, LinkBreak>,
        check_sequence: bool,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (index, block) in matched {
            let seq = block.sequence_number;

            if let Some(brk) = breaks.get(index) {
                violations.push(Violation {
                    sequence_number: seq,
                    kind: ViolationKind::BrokenLink,
                    description: format!(
                        "previous digest {} does not match expected {}",
                        brk.found.short_hex(),
                        brk.expected.short_hex()
                    ),
                });
            }

            let position = *index as u64 + 1;
            if check_sequence && seq != position {
                violations.push(Violation {
                    sequence_number: seq,
                    kind: ViolationKind::SequenceGap,
                    description: format!("expected sequence {position}, found {seq}"),
                });
            }

            match block.recompute_digest(self.digest) {
                Ok(computed) if computed == block.digest => {}
                Ok(computed) => violations.push(Violation {
                    sequence_number: seq,
                    kind: ViolationKind::DigestMismatch,
                    description: format!(
                        "stored digest {} but contents hash to {}",
                        block.digest.short_hex(),
                        computed.short_hex()
                    ),
                }),
                Err(e) => violations.push(Violation {
                    sequence_number: seq,
                    kind: ViolationKind::DigestMismatch,
                    description: format!("cannot recompute digest: {e}"),
                }),
            }

            if !self.pow.is_satisfied(&block.digest) {
                violations.push(Violation {
                    sequence_number: seq,
                    kind: ViolationKind::InsufficientWork,
                    description: format!(
                        "digest has {} leading zeros, target is {}",
                        block.digest.leading_zero_nibbles(),
                        self.pow.difficulty()
                    ),
                });
            }
        }

        violations
    }
}

fn report(
    entity_id: Option<String>,
    matched: &[(usize, &Block)],
    scope: LinkageScope,
    violations: Vec<Violation>,
) -> VerificationReport {
    let block_count = matched.len() as u64;
    let latest = matched.last().map(|(_, block)| *block);
    let valid = violations.is_empty();

    VerificationReport {
        entity_id,
        valid,
        block_count,
        latest_sequence_number: latest.map(|b| b.sequence_number),
        latest_timestamp: latest.map(|b| b.created_at_millis),
        integrity_score: integrity_score(valid, block_count),
        scope,
        violations,
    }
}
