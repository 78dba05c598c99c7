use sha2::{Digest, Sha256};
use srcp_core::CanonicalValue;

/// SHA-256 of arbitrary bytes, hex-encoded.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    hex::encode(digest)
}

/// SHA-256 of arbitrary bytes, raw.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// SHA-256 of a value's canonical encoding — the one hashing entry point
/// shared by `srcp-ledger`, `srcp-kernel`, and `srcp-fabric`.
pub fn canonical_hash_hex(value: &CanonicalValue) -> String {
    sha256_hex(value.encode().as_bytes())
}
