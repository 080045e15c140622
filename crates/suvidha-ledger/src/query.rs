use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::records::Block;

/// Summary figures over the whole chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerStatistics {
    pub total_blocks: u64,
    pub distinct_entities: u64,
    pub latest_block: Option<Block>,
    /// Byte length of the chain serialized as JSON.
    pub approximate_storage_size: u64,
}

impl LedgerStatistics {
    pub fn from_chain(chain: &[Block]) -> LedgerResult<Self> {
        let distinct: HashSet<&str> = chain.iter().map(Block::entity_id).collect();
        let encoded =
            serde_json::to_vec(chain).map_err(|e| LedgerError::Serialization(e.to_string()))?;

        Ok(Self {
            total_blocks: chain.len() as u64,
            distinct_entities: distinct.len() as u64,
            latest_block: chain.last().cloned(),
            approximate_storage_size: encoded.len() as u64,
        })
    }
}

/// Blocks of one entity, in global order.
pub fn filter_entity(chain: Vec<Block>, entity_id: &str) -> Vec<Block> {
    chain
        .into_iter()
        .filter(|block| block.entity_id() == entity_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::BlockPayload;
    use suvidha_types::{Action, Digest};

    fn block(seq: u64, entity: &str) -> Block {
        Block {
            sequence_number: seq,
            digest: Digest::from_hash([seq as u8; 32]),
            previous_digest: Digest::zero(),
            created_at_millis: seq,
            nonce: 0,
            payload: BlockPayload {
                entity_id: entity.into(),
                action: Action::Created,
                actor: "citizen".into(),
                details: String::new(),
            },
        }
    }

    #[test]
    fn empty_chain_statistics() {
        let stats = LedgerStatistics::from_chain(&[]).unwrap();
        assert_eq!(stats.total_blocks, 0);
        assert_eq!(stats.distinct_entities, 0);
        assert!(stats.latest_block.is_none());
        assert_eq!(stats.approximate_storage_size, 2);
    }

    #[test]
    fn counts_distinct_entities_and_latest() {
        let chain = vec![block(1, "A"), block(2, "B"), block(3, "A")];
        let stats = LedgerStatistics::from_chain(&chain).unwrap();
        assert_eq!(stats.total_blocks, 3);
        assert_eq!(stats.distinct_entities, 2);
        assert_eq!(stats.latest_block.unwrap().sequence_number, 3);
        assert_eq!(
            stats.approximate_storage_size,
            serde_json::to_vec(&chain).unwrap().len() as u64
        );
    }

    #[test]
    fn filter_keeps_global_order() {
        let chain = vec![block(1, "A"), block(2, "B"), block(3, "A")];
        let seqs: Vec<u64> = filter_entity(chain, "A")
            .iter()
            .map(|b| b.sequence_number)
            .collect();
        assert_eq!(seqs, vec![1, 3]);
    }
}
