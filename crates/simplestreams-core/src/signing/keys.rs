//! Verification key loading and identification.

use std::path::Path;

use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

use crate::error::{StreamsError, StreamsResult};

/// Parse an Ed25519 public key from SPKI PEM.
pub fn parse_public_key_pem(pem: &str) -> StreamsResult<VerifyingKey> {
    use pkcs8::DecodePublicKey;

    VerifyingKey::from_public_key_pem(pem.trim()).map_err(|e| StreamsError::Config {
        message: format!("invalid SPKI public key: {e}"),
    })
}

/// Load an Ed25519 public key from an SPKI PEM file.
pub fn load_public_key_pem(path: &Path) -> StreamsResult<VerifyingKey> {
    let pem = std::fs::read_to_string(path).map_err(|e| StreamsError::Config {
        message: format!("failed to read public key {}: {e}", path.display()),
    })?;
    parse_public_key_pem(&pem)
}

/// Compute the key id: `sha256:<lowercase-hex>` of the SPKI DER encoding.
pub fn compute_key_id(key: &VerifyingKey) -> StreamsResult<String> {
    use pkcs8::EncodePublicKey;

    let der = key.to_public_key_der().map_err(|e| StreamsError::Config {
        message: format!("failed to encode public key as SPKI DER: {e}"),
    })?;
    Ok(format!("sha256:{}", hex::encode(Sha256::digest(der.as_bytes()))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use pkcs8::{EncodePublicKey, LineEnding};

    #[test]
    fn test_pem_round_trip() {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let pem = signing_key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();

        let parsed = parse_public_key_pem(&pem).unwrap();
        assert_eq!(parsed, signing_key.verifying_key());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public_key.pem");
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let pem = signing_key
            .verifying_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        std::fs::write(&path, pem).unwrap();

        let loaded = load_public_key_pem(&path).unwrap();
        assert_eq!(loaded, signing_key.verifying_key());
    }

    #[test]
    fn test_garbage_pem_is_config_error() {
        let result = parse_public_key_pem("not a key");
        assert!(matches!(result, Err(StreamsError::Config { .. })));
    }

    #[test]
    fn test_key_id_format_and_stability() {
        let key = SigningKey::generate(&mut rand::thread_rng()).verifying_key();
        let id = compute_key_id(&key).unwrap();
        assert!(id.starts_with("sha256:"));
        assert_eq!(id.len(), "sha256:".len() + 64);
        assert_eq!(id, compute_key_id(&key).unwrap());
    }
}
