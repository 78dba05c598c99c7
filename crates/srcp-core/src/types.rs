/// Logical clock value supplied by a `Clock` adapter. Never a wall-clock
/// read performed directly by core code.
pub type Timestamp = i64;

/// Opaque, adapter-minted uniqueness token. Compared only for equality.
pub type Nonce = String;

/// `"did:srcp:" || base32(...)` — see `srcp-crypto::did` for derivation.
pub type Did = String;

/// Lower-hex-encoded SHA-256 digest, 64 characters.
pub type HexHash = String;

/// The fixed genesis placeholder used as `prev_hash` for ledger entry 0:
/// 64 `'0'` characters, matching the width of a hex-encoded SHA-256 digest.
pub fn genesis_hash_placeholder() -> HexHash {
    "0".repeat(64)
}
