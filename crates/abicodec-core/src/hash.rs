//! Keccak-256 hashing and hex helpers.
//!
//! Selectors and event topics are both slices of
//! `keccak256(canonical_signature)`, e.g.:
//!   keccak256("transfer(address,uint256)")[..4] → 0xa9059cbb

use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 over arbitrary bytes.
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data.as_ref());
    hasher.finalize(&mut output);
    output
}

/// Strip an optional `0x` / `0X` prefix.
pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode a hex string with or without a `0x` prefix.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(strip_0x(s))
}

/// Lower-case, `0x`-prefixed hex rendering.
pub fn to_hex_prefixed(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Concatenate byte slices in order.
pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}
