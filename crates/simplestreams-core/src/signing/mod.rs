//! Clearsign verification.
//!
//! Documents may arrive wrapped in a cleartext signature envelope. [`Verifier`]
//! checks the envelope against a single Ed25519 key and returns the body:
//!
//! - no envelope at all: [`StreamsError::NotSigned`]
//! - envelope present, anything wrong with it: [`StreamsError::SignatureInvalid`]
//!
//! The key is either passed explicitly ([`Verifier::new`]) or taken from the
//! process-wide slot managed by [`set_signing_key`].

mod armor;
pub mod clearsign;
pub mod keys;

use std::sync::RwLock;

use ed25519_dalek::{Signature, Verifier as _, VerifyingKey};
use tracing::debug;

use crate::error::{StreamsError, StreamsResult};

pub use clearsign::HashAlgorithm;
pub use keys::{compute_key_id, load_public_key_pem, parse_public_key_pem};

/// Armor header naming the signer.
pub const KEY_ID_HEADER: &str = "Key-Id";

static SIGNING_KEY: RwLock<Option<VerifyingKey>> = RwLock::new(None);

/// Replace the process-wide verification key, returning the previous one.
pub fn set_signing_key(key: Option<VerifyingKey>) -> Option<VerifyingKey> {
    let mut slot = SIGNING_KEY.write().unwrap_or_else(|e| e.into_inner());
    std::mem::replace(&mut *slot, key)
}

/// Current process-wide verification key.
pub fn signing_key() -> Option<VerifyingKey> {
    *SIGNING_KEY.read().unwrap_or_else(|e| e.into_inner())
}

/// Install `key` until the guard is dropped.
pub fn override_signing_key(key: Option<VerifyingKey>) -> KeyOverride {
    KeyOverride {
        previous: set_signing_key(key),
    }
}

/// Restores the previous process-wide key on drop.
#[must_use = "the previous key is restored when the guard is dropped"]
#[derive(Debug)]
pub struct KeyOverride {
    previous: Option<VerifyingKey>,
}

impl Drop for KeyOverride {
    fn drop(&mut self) {
        set_signing_key(self.previous.take());
    }
}

/// Verification context holding the active key.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    key: Option<VerifyingKey>,
}

impl Verifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key: Some(key) }
    }

    /// A verifier without a key: every signed document fails verification.
    pub fn without_key() -> Self {
        Self { key: None }
    }

    /// Snapshot of the process-wide key.
    pub fn from_process_key() -> Self {
        Self { key: signing_key() }
    }

    pub fn key(&self) -> Option<&VerifyingKey> {
        self.key.as_ref()
    }

    /// Verify a clearsigned document and return its plaintext body.
    ///
    /// Every body line comes back terminated by `\n`, so a signed text without
    /// a final newline gains one.
    pub fn verify(&self, raw: &[u8]) -> StreamsResult<Vec<u8>> {
        let envelope = clearsign::parse(raw)?.ok_or(StreamsError::NotSigned)?;

        let key = self
            .key
            .as_ref()
            .ok_or_else(|| StreamsError::invalid_signature("no verification key configured"))?;

        if let Some(claimed) = envelope.signature.header(KEY_ID_HEADER) {
            let actual = compute_key_id(key)?;
            if claimed != actual {
                return Err(StreamsError::invalid_signature(format!(
                    "signed by key {claimed}, expected {actual}"
                )));
            }
        }

        let signature = Signature::from_slice(&envelope.signature.data).map_err(|e| {
            StreamsError::invalid_signature(format!("malformed signature: {e}"))
        })?;

        let digest = envelope.hash.digest(&envelope.canonical_text());
        key.verify(&digest, &signature)
            .map_err(|_| StreamsError::invalid_signature("signature does not match content"))?;

        debug!(hash = envelope.hash.header_name(), "clearsign signature verified");
        Ok(envelope.plaintext())
    }
}

/// Wrap `text` in a clearsign envelope signed with `key`.
#[cfg(any(test, feature = "test-support"))]
pub fn clearsign(
    text: &str,
    key: &ed25519_dalek::SigningKey,
    hash: HashAlgorithm,
) -> StreamsResult<String> {
    use ed25519_dalek::Signer;

    let lines = clearsign::split_lines(text);
    let digest = hash.digest(&clearsign::canonical_text(&lines));
    let signature = key.sign(&digest);
    let block = armor::ArmorBlock {
        headers: vec![(
            KEY_ID_HEADER.to_string(),
            compute_key_id(&key.verifying_key())?,
        )],
        data: signature.to_bytes().to_vec(),
    };
    Ok(clearsign::encode(hash, &lines, &block))
}
