use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use p256::ecdsa::signature::{RandomizedSigner, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use srcp_core::{CanonicalValue, Did, SrcpError};

use crate::did::derive_did;
use crate::jwk::{PrivateKeyJwk, PublicKeyJwk};

/// A sovereign cryptographic identity: an ECDSA P-256 key pair plus a
/// `did:srcp:` identifier derived from the public key.
///
/// The private key is owned exclusively by this struct — there is no
/// public accessor for it. The only ways to use it are [`Identity::sign`]
/// (never reveals it) and [`Identity::export`] (an explicit, visible
/// operation that hands the caller a portable copy of both keys).
pub struct Identity {
    username: String,
    did: Did,
    signing_key: SigningKey,
}

/// A portable, serialisable copy of an [`Identity`], including private key
/// material. Produced only by [`Identity::export`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportedIdentity {
    pub username: String,
    pub did: Did,
    pub public_key_jwk: PublicKeyJwk,
    pub private_key_jwk: PrivateKeyJwk,
}

impl Identity {
    /// Generate a fresh ECDSA P-256 key pair and derive its DID.
    ///
    /// Usernames are accepted verbatim — empty, long, Unicode, and
    /// punctuated strings are all valid and never normalised. Two calls
    /// with the same username yield different DIDs, since each call
    /// mints fresh key material.
    pub fn create(username: impl Into<String>) -> Self {
        let signing_key = SigningKey::random(&mut rand_core::OsRng);
        let public_jwk = PublicKeyJwk::from_verifying_key(signing_key.verifying_key());
        let did = derive_did(&public_jwk);
        Self {
            username: username.into(),
            did,
            signing_key,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn did(&self) -> &Did {
        &self.did
    }

    pub fn public_key_jwk(&self) -> PublicKeyJwk {
        PublicKeyJwk::from_verifying_key(self.signing_key.verifying_key())
    }

    /// Canonicalise `value`, sign it with a fresh random nonce, and return
    /// the signature as a URL-safe, unpadded base64 string over the fixed
    /// 64-byte IEEE P1363 (`r‖s`) encoding. Two signings of the same input
    /// differ (ECDSA signing is randomised); both verify.
    pub fn sign(&self, value: &CanonicalValue) -> String {
        let message = value.encode();
        let signature: Signature = self
            .signing_key
            .sign_with_rng(&mut rand_core::OsRng, message.as_bytes());
        URL_SAFE_NO_PAD.encode(signature.to_bytes())
    }

    /// Verify a signature produced by [`Identity::sign`] against a public
    /// key. Never panics or raises — any tampered input, mismatched key,
    /// or malformed signature/JWK simply yields `false`.
    pub fn verify(public_key: &PublicKeyJwk, value: &CanonicalValue, signature: &str) -> bool {
        let verifying_key = match public_key.to_verifying_key() {
            Ok(k) => k,
            Err(_) => return false,
        };
        let sig_bytes = match URL_SAFE_NO_PAD.decode(signature) {
            Ok(b) => b,
            Err(_) => return false,
        };
        let sig = match Signature::from_slice(&sig_bytes) {
            Ok(s) => s,
            Err(_) => return false,
        };
        let message = value.encode();
        verifying_key.verify(message.as_bytes(), &sig).is_ok()
    }

    /// Produce a portable, serialisable copy holding both keys.
    pub fn export(&self) -> ExportedIdentity {
        ExportedIdentity {
            username: self.username.clone(),
            did: self.did.clone(),
            public_key_jwk: self.public_key_jwk(),
            private_key_jwk: PrivateKeyJwk::from_signing_key(&self.signing_key),
        }
    }

    /// Reconstruct an `Identity` from a previously exported record.
    ///
    /// `import(export(x)).did() == x.did()`, and the imported identity's
    /// signatures verify under the original public key — both keys
    /// round-trip exactly through the JWK encoding.
    pub fn import(record: &ExportedIdentity) -> Result<Identity, SrcpError> {
        let signing_key = record.private_key_jwk.to_signing_key()?;
        Ok(Self {
            username: record.username.clone(),
            did: record.did.clone(),
            signing_key,
        })
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("did", &self.did)
            .finish_non_exhaustive()
    }
}
