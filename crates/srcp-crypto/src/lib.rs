pub mod did;
pub mod hash;
pub mod identity;
pub mod jwk;

pub use did::derive_did;
pub use hash::{canonical_hash_hex, sha256_bytes, sha256_hex};
pub use identity::{ExportedIdentity, Identity};
pub use jwk::{PrivateKeyJwk, PublicKeyJwk};
