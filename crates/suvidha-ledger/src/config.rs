use serde::{Deserialize, Serialize};
use suvidha_crypto::{DigestAlgorithm, ProofOfWork};
use suvidha_store::validate_key;

use crate::error::{LedgerError, LedgerResult};

/// What `append` does when mining hits the attempt cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExhaustionPolicy {
    /// Return `LedgerError::MiningFailed` and persist nothing.
    #[default]
    Fail,
    /// Persist the best attempt; `verify` will flag it as insufficient work.
    AcceptBest,
}

/// Which predecessor a block's `previous_digest` is checked against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkageScope {
    /// The block just before it in the full chain.
    #[default]
    Global,
    /// The previous block of the same entity. Weaker: interleaved entities
    /// always fail this check, and the first block is never checked.
    Entity,
}

/// Ledger tuning and storage layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Required leading `'0'` hex characters on every block digest.
    pub difficulty: u32,
    /// Nonce search cap per block.
    pub max_attempts: u64,
    pub on_exhaustion: ExhaustionPolicy,
    pub linkage_scope: LinkageScope,
    pub digest: DigestAlgorithm,
    /// Store key of the block list.
    pub blocks_key: String,
    /// Store key of the certificate list.
    pub certificates_key: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: ProofOfWork::DEFAULT_DIFFICULTY,
            max_attempts: ProofOfWork::DEFAULT_MAX_ATTEMPTS,
            on_exhaustion: ExhaustionPolicy::default(),
            linkage_scope: LinkageScope::default(),
            digest: DigestAlgorithm::default(),
            blocks_key: "suvidha_blockchain".into(),
            certificates_key: "suvidha_certificates".into(),
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> LedgerResult<()> {
        if self.difficulty as usize > suvidha_types::Digest::HEX_LEN {
            return Err(LedgerError::InvalidConfig(format!(
                "difficulty {} exceeds digest width",
                self.difficulty
            )));
        }
        if self.max_attempts == 0 {
            return Err(LedgerError::InvalidConfig(
                "max_attempts must be at least 1".into(),
            ));
        }
        for key in [&self.blocks_key, &self.certificates_key] {
            validate_key(key).map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        }
        if self.blocks_key == self.certificates_key {
            return Err(LedgerError::InvalidConfig(
                "blocks_key and certificates_key must differ".into(),
            ));
        }
        Ok(())
    }

    pub fn proof_of_work(&self) -> ProofOfWork {
        ProofOfWork::new(self.difficulty, self.max_attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = LedgerConfig::default();
        assert_eq!(c.difficulty, 2);
        assert_eq!(c.max_attempts, 50_000);
        assert_eq!(c.on_exhaustion, ExhaustionPolicy::Fail);
        assert_eq!(c.linkage_scope, LinkageScope::Global);
        assert_eq!(c.digest, DigestAlgorithm::Sha256);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: LedgerConfig =
            serde_json::from_str(r#"{"difficulty": 3, "linkage_scope": "entity"}"#).unwrap();
        assert_eq!(c.difficulty, 3);
        assert_eq!(c.linkage_scope, LinkageScope::Entity);
        assert_eq!(c.max_attempts, 50_000);
    }

    #[test]
    fn exhaustion_policy_names() {
        let p: ExhaustionPolicy = serde_json::from_str("\"accept-best\"").unwrap();
        assert_eq!(p, ExhaustionPolicy::AcceptBest);
    }

    #[test]
    fn rejects_shared_keys() {
        let c = LedgerConfig {
            certificates_key: "suvidha_blockchain".into(),
            ..LedgerConfig::default()
        };
        assert!(matches!(c.validate(), Err(LedgerError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_attempts_and_wide_difficulty() {
        let zero = LedgerConfig {
            max_attempts: 0,
            ..LedgerConfig::default()
        };
        assert!(zero.validate().is_err());

        let wide = LedgerConfig {
            difficulty: 65,
            ..LedgerConfig::default()
        };
        assert!(wide.validate().is_err());
    }
}
