//! ASCII armor for the detached signature block (RFC 4880 §6).

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::{StreamsError, StreamsResult};

pub(crate) const SIGNATURE_BEGIN: &str = "-----BEGIN PGP SIGNATURE-----";
pub(crate) const SIGNATURE_END: &str = "-----END PGP SIGNATURE-----";

const CRC24_INIT: u32 = 0x00B7_04CE;
const CRC24_POLY: u32 = 0x0186_4CFB;
const LINE_WIDTH: usize = 64;

/// Decoded armor block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArmorBlock {
    pub headers: Vec<(String, String)>,
    pub data: Vec<u8>,
}

impl ArmorBlock {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub(crate) fn crc24(data: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;
    for byte in data {
        crc ^= u32::from(*byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24_POLY;
            }
        }
    }
    crc & 0x00FF_FFFF
}

fn checksum_line(data: &[u8]) -> String {
    let crc = crc24(data);
    let bytes = [(crc >> 16) as u8, (crc >> 8) as u8, crc as u8];
    format!("={}", BASE64.encode(bytes))
}

/// Decode the lines following the `BEGIN PGP SIGNATURE` marker.
///
/// `lines` must start right after the begin marker. Returns the block and the
/// number of lines consumed, including the end marker.
pub(crate) fn decode_signature_block(lines: &[&str]) -> StreamsResult<(ArmorBlock, usize)> {
    let mut idx = 0;
    let mut headers = Vec::new();

    // Armor headers run until the first blank line.
    loop {
        let line = lines
            .get(idx)
            .ok_or_else(|| StreamsError::invalid_signature("truncated signature armor"))?;
        idx += 1;
        if line.trim().is_empty() {
            break;
        }
        let (key, value) = line.split_once(':').ok_or_else(|| {
            StreamsError::invalid_signature(format!("invalid armor header line: {line:?}"))
        })?;
        headers.push((key.trim().to_string(), value.trim().to_string()));
    }

    let mut body = String::new();
    let mut checksum = None;
    loop {
        let line = lines
            .get(idx)
            .ok_or_else(|| StreamsError::invalid_signature("missing signature end marker"))?
            .trim();
        idx += 1;
        if line == SIGNATURE_END {
            break;
        }
        if let Some(sum) = line.strip_prefix('=') {
            checksum = Some(sum.to_string());
            continue;
        }
        body.push_str(line);
    }

    let data = BASE64
        .decode(body.as_bytes())
        .map_err(|e| StreamsError::invalid_signature(format!("invalid armor base64: {e}")))?;

    if let Some(sum) = checksum {
        let expected = checksum_line(&data);
        if expected[1..] != sum {
            return Err(StreamsError::invalid_signature(format!(
                "armor checksum mismatch: expected {}, got {}",
                &expected[1..],
                sum
            )));
        }
    }

    Ok((ArmorBlock { headers, data }, idx))
}

/// Encode a signature block, markers included, ending with a newline.
#[cfg(any(test, feature = "test-support"))]
pub(crate) fn encode_signature_block(block: &ArmorBlock) -> String {
    let mut out = String::new();
    out.push_str(SIGNATURE_BEGIN);
    out.push('\n');
    for (key, value) in &block.headers {
        out.push_str(&format!("{key}: {value}\n"));
    }
    out.push('\n');

    let encoded = BASE64.encode(&block.data);
    for chunk in encoded.as_bytes().chunks(LINE_WIDTH) {
        // base64 output is ASCII
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push('\n');
    }
    out.push_str(&checksum_line(&block.data));
    out.push('\n');
    out.push_str(SIGNATURE_END);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc24_known_vectors() {
        // Empty input yields the initial register value.
        assert_eq!(crc24(b""), CRC24_INIT);
        // Reference value for "123456789" from RFC 4880 CRC-24 implementations.
        assert_eq!(crc24(b"123456789"), 0x0021_CF02);
    }

    #[test]
    fn test_decode_encoded_block() {
        let block = ArmorBlock {
            headers: vec![("Key-Id".to_string(), "sha256:abc".to_string())],
            data: (0u8..100).collect(),
        };
        let encoded = encode_signature_block(&block);
        let lines: Vec<&str> = encoded.lines().collect();
        assert_eq!(lines[0], SIGNATURE_BEGIN);

        let (decoded, consumed) = decode_signature_block(&lines[1..]).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(consumed, lines.len() - 1);
        assert_eq!(decoded.header("key-id"), Some("sha256:abc"));
    }

    #[test]
    fn test_checksum_mismatch_rejected() {
        let lines = ["", "AAAA", "=AAAA", SIGNATURE_END];
        let err = decode_signature_block(&lines).unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"), "{err}");
    }

    #[test]
    fn test_missing_end_marker_rejected() {
        let lines = ["Version: test", "", "AAAA"];
        let err = decode_signature_block(&lines).unwrap_err();
        assert!(matches!(err, StreamsError::SignatureInvalid { .. }));
    }
}
