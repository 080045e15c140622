use suvidha_types::Digest;

/// Anything that sits in a hash chain.
pub trait ChainLink {
    /// The record's own digest.
    fn digest(&self) -> Digest;
    /// The digest it claims as predecessor (zero sentinel for genesis).
    fn previous_digest(&self) -> Digest;
}

impl<L: ChainLink + ?Sized> ChainLink for &L {
    fn digest(&self) -> Digest {
        (**self).digest()
    }
    fn previous_digest(&self) -> Digest {
        (**self).previous_digest()
    }
}

/// A place where a record does not point at its predecessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkBreak {
    /// Position in the slice that was checked.
    pub index: usize,
    pub expected: Digest,
    pub found: Digest,
}

/// Hash chain linkage checker.
///
/// Only looks at `previous_digest` pointers; recomputing each record's own
/// digest is the caller's job since only it knows the canonical payload.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Collect every broken link in `records`.
    ///
    /// With `anchored` the first record must carry the zero sentinel, which
    /// is what a complete chain looks like. Without it the first record is
    /// taken on trust, for checking a slice cut out of a longer chain.
    pub fn link_breaks<L: ChainLink>(records: &[L], anchored: bool) -> Vec<LinkBreak> {
        let mut breaks = Vec::new();

        for (index, record) in records.iter().enumerate() {
            let expected = match index {
                0 if anchored => Digest::zero(),
                0 => continue,
                _ => records[index - 1].digest(),
            };
            let found = record.previous_digest();
            if found != expected {
                breaks.push(LinkBreak {
                    index,
                    expected,
                    found,
                });
            }
        }

        breaks
    }

    /// Whether `records` forms an unbroken chain from the zero sentinel.
    pub fn is_intact<L: ChainLink>(records: &[L]) -> bool {
        Self::link_breaks(records, true).is_empty()
    }
}
