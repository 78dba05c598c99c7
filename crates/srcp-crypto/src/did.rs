//! DID derivation: `did:srcp:` followed by 32 characters of base32 over
//! the SHA-256 digest of the canonical public key.
//!
//! spec.md leaves the base32 alphabet/case/padding unspecified. This
//! workspace resolves that open question (see DESIGN.md) with Crockford
//! base32, lower-cased, unpadded, truncated to the first 32 characters.

use crate::hash::canonical_hash_hex;
use crate::jwk::PublicKeyJwk;
use srcp_core::Did;

const DID_PREFIX: &str = "did:srcp:";
const DID_SUFFIX_LEN: usize = 32;

pub fn derive_did(public_key: &PublicKeyJwk) -> Did {
    let digest_hex = canonical_hash_hex(&public_key.canonical());
    let digest = hex::decode(&digest_hex).expect("canonical_hash_hex always returns valid hex");
    let encoded = base32::encode(base32::Alphabet::Crockford, &digest).to_lowercase();
    let suffix: String = encoded.chars().take(DID_SUFFIX_LEN).collect();
    format!("{DID_PREFIX}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey;

    #[test]
    fn did_has_expected_prefix_and_length() {
        let signing = SigningKey::random(&mut rand_core::OsRng);
        let jwk = PublicKeyJwk::from_verifying_key(signing.verifying_key());
        let did = derive_did(&jwk);
        assert!(did.starts_with(DID_PREFIX));
        assert_eq!(did.len(), DID_PREFIX.len() + DID_SUFFIX_LEN);
    }

    #[test]
    fn distinct_keys_yield_distinct_dids() {
        let a = SigningKey::random(&mut rand_core::OsRng);
        let b = SigningKey::random(&mut rand_core::OsRng);
        let did_a = derive_did(&PublicKeyJwk::from_verifying_key(a.verifying_key()));
        let did_b = derive_did(&PublicKeyJwk::from_verifying_key(b.verifying_key()));
        assert_ne!(did_a, did_b);
    }

    #[test]
    fn did_derivation_is_deterministic_in_the_key() {
        let signing = SigningKey::random(&mut rand_core::OsRng);
        let jwk = PublicKeyJwk::from_verifying_key(signing.verifying_key());
        assert_eq!(derive_did(&jwk), derive_did(&jwk));
    }
}
