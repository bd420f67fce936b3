//! Cleartext signature framework (RFC 4880 §7).
//!
//! ```text
//! -----BEGIN PGP SIGNED MESSAGE-----
//! Hash: SHA256
//!
//! <dash-escaped body>
//! -----BEGIN PGP SIGNATURE-----
//! Key-Id: sha256:<hex>
//!
//! <base64 Ed25519 signature>
//! =<crc24>
//! -----END PGP SIGNATURE-----
//! ```

use sha2::{Digest, Sha256, Sha512};

use super::armor::{decode_signature_block, ArmorBlock, SIGNATURE_BEGIN};
use crate::error::{StreamsError, StreamsResult};

pub(crate) const MESSAGE_BEGIN: &str = "-----BEGIN PGP SIGNED MESSAGE-----";

/// Digest applied to the canonical text before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub fn from_header(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "SHA256" => Some(Self::Sha256),
            "SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    pub fn header_name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

/// A parsed clearsign envelope (signature not yet checked).
#[derive(Debug, Clone)]
pub(crate) struct Envelope {
    pub hash: HashAlgorithm,
    /// Body lines, dash-escaping removed, without line terminators.
    pub lines: Vec<String>,
    pub signature: ArmorBlock,
}

impl Envelope {
    /// Body as returned to callers: every line terminated by `\n`.
    pub fn plaintext(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for line in &self.lines {
            out.extend_from_slice(line.as_bytes());
            out.push(b'\n');
        }
        out
    }

    /// Bytes covered by the signature.
    pub fn canonical_text(&self) -> Vec<u8> {
        canonical_text(&self.lines)
    }
}

/// Trailing whitespace stripped per line, CRLF separators, no final line ending.
pub(crate) fn canonical_text<S: AsRef<str>>(lines: &[S]) -> Vec<u8> {
    let canonical: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref().trim_end_matches([' ', '\t']))
        .collect();
    canonical.join("\r\n").into_bytes()
}

/// Locate the envelope and split it into its parts.
///
/// `Ok(None)` means no envelope marker exists in `raw`.
pub(crate) fn parse(raw: &[u8]) -> StreamsResult<Option<Envelope>> {
    let Some(start) = find_marker(raw) else {
        return Ok(None);
    };

    let text = std::str::from_utf8(&raw[start..])
        .map_err(|e| StreamsError::invalid_signature(format!("envelope is not UTF-8: {e}")))?;
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    // lines[0] is the begin marker; headers follow up to the first blank line.
    let mut idx = 1;
    let mut hash = None;
    loop {
        let line = lines
            .get(idx)
            .ok_or_else(|| StreamsError::invalid_signature("truncated envelope header"))?;
        idx += 1;
        if line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Hash:") {
            let algo = HashAlgorithm::from_header(value).ok_or_else(|| {
                StreamsError::invalid_signature(format!(
                    "unsupported hash algorithm: {}",
                    value.trim()
                ))
            })?;
            hash = Some(algo);
        }
    }
    let hash = hash.ok_or_else(|| StreamsError::invalid_signature("missing Hash header"))?;

    let mut body = Vec::new();
    loop {
        let line = lines
            .get(idx)
            .ok_or_else(|| StreamsError::invalid_signature("missing signature block"))?;
        idx += 1;
        if *line == SIGNATURE_BEGIN {
            break;
        }
        let unescaped = line.strip_prefix("- ").unwrap_or(line);
        body.push(unescaped.to_string());
    }

    let (signature, _) = decode_signature_block(&lines[idx..])?;

    Ok(Some(Envelope {
        hash,
        lines: body,
        signature,
    }))
}

/// Byte offset of the begin marker, which must start a line.
fn find_marker(raw: &[u8]) -> Option<usize> {
    let marker = MESSAGE_BEGIN.as_bytes();
    let mut offset = 0;
    while offset + marker.len() <= raw.len() {
        let rest = &raw[offset..];
        if rest.starts_with(marker) {
            return Some(offset);
        }
        match rest.iter().position(|b| *b == b'\n') {
            Some(nl) => offset += nl + 1,
            None => return None,
        }
    }
    None
}

/// Split `text` into body lines. A trailing newline terminates the last line.
#[cfg(any(test, feature = "test-support"))]
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect()
}

/// Write an envelope around `lines`, dash-escaping as needed.
#[cfg(any(test, feature = "test-support"))]
pub(crate) fn encode(hash: HashAlgorithm, lines: &[&str], signature: &ArmorBlock) -> String {
    let mut out = String::new();
    out.push_str(MESSAGE_BEGIN);
    out.push('\n');
    out.push_str(&format!("Hash: {}\n\n", hash.header_name()));
    for line in lines {
        if line.starts_with('-') {
            out.push_str("- ");
        }
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&super::armor::encode_signature_block(signature));
    out
}
