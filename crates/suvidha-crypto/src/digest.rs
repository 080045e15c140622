use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::Sha256;
use suvidha_types::Digest;

/// Hash function the ledger seals blocks and certificates with.
///
/// Implementations must be deterministic and collision-resistant at the
/// 256-bit level.
pub trait DigestProvider: Send + Sync {
    /// Which algorithm this provider runs.
    fn algorithm(&self) -> DigestAlgorithm;

    /// Hash raw bytes.
    fn digest(&self, data: &[u8]) -> Digest;

    /// Hash the UTF-8 bytes of a string.
    fn digest_str(&self, data: &str) -> Digest {
        self.digest(data.as_bytes())
    }

    /// Hash the compact JSON encoding of a serializable value.
    ///
    /// Field order follows the struct declaration, so callers that need a
    /// canonical form must declare fields in canonical order.
    fn digest_json<T: Serialize>(&self, value: &T) -> Result<Digest, DigestError>
    where
        Self: Sized,
    {
        let data =
            serde_json::to_vec(value).map_err(|e| DigestError::Serialization(e.to_string()))?;
        Ok(self.digest(&data))
    }
}

/// Selectable digest algorithms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    /// Construct the provider for this algorithm.
    pub fn provider(self) -> Box<dyn DigestProvider> {
        match self {
            Self::Sha256 => Box::new(Sha256Digest),
            Self::Blake3 => Box::new(Blake3Digest),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// SHA-256 provider.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Digest;

impl DigestProvider for Sha256Digest {
    fn algorithm(&self) -> DigestAlgorithm {
        DigestAlgorithm::Sha256
    }

    fn digest(&self, data: &[u8]) -> Digest {
        use sha2::Digest as _;
        let mut hasher = Sha256::new();
        hasher.update(data);
        Digest::from_hash(hasher.finalize().into())
    }
}

/// BLAKE3 provider.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Digest;

impl DigestProvider for Blake3Digest {
    fn algorithm(&self) -> DigestAlgorithm {
        DigestAlgorithm::Blake3
    }

    fn digest(&self, data: &[u8]) -> Digest {
        Digest::from_hash(*blake3::hash(data).as_bytes())
    }
}

impl<D: DigestProvider + ?Sized> DigestProvider for Box<D> {
    fn algorithm(&self) -> DigestAlgorithm {
        (**self).algorithm()
    }

    fn digest(&self, data: &[u8]) -> Digest {
        (**self).digest(data)
    }
}

impl<D: DigestProvider + ?Sized> DigestProvider for Arc<D> {
    fn algorithm(&self) -> DigestAlgorithm {
        (**self).algorithm()
    }

    fn digest(&self, data: &[u8]) -> Digest {
        (**self).digest(data)
    }
}

/// Errors from digest operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vectors() {
        assert_eq!(
            Sha256Digest.digest(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            Sha256Digest.digest_str("abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn blake3_known_vector() {
        assert_eq!(
            Blake3Digest.digest(b"").to_hex(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn algorithms_disagree() {
        assert_ne!(Sha256Digest.digest(b"pothole"), Blake3Digest.digest(b"pothole"));
    }

    #[test]
    fn digest_json_uses_compact_encoding() {
        let value = serde_json::json!({"entityId": "C-1"});
        let via_json = Sha256Digest.digest_json(&value).unwrap();
        assert_eq!(via_json, Sha256Digest.digest_str(r#"{"entityId":"C-1"}"#));
    }

    #[test]
    fn boxed_provider_delegates() {
        let boxed = DigestAlgorithm::Blake3.provider();
        assert_eq!(boxed.algorithm(), DigestAlgorithm::Blake3);
        assert_eq!(boxed.digest(b"x"), Blake3Digest.digest(b"x"));
    }

    #[test]
    fn algorithm_config_names() {
        let parsed: DigestAlgorithm = serde_json::from_str("\"blake3\"").unwrap();
        assert_eq!(parsed, DigestAlgorithm::Blake3);
        assert_eq!(DigestAlgorithm::default().to_string(), "sha256");
    }
}
