//! A portable JSON-Web-Key-like representation for P-256 key material.
//! Coordinates are base64url, unpadded.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};
use srcp_core::{CanonicalValue, SrcpError};

/// The public half of a P-256 key pair, portable across processes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKeyJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
}

/// The full key pair, portable across processes. Only ever produced by an
/// explicit `Identity::export` call — never held as a long-lived value
/// inside `Identity` itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrivateKeyJwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    pub y: String,
    pub d: String,
}

impl PublicKeyJwk {
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let x = point.x().expect("uncompressed point always has x");
        let y = point.y().expect("uncompressed point always has y");
        Self {
            kty: "EC".to_string(),
            crv: "P-256".to_string(),
            x: URL_SAFE_NO_PAD.encode(x),
            y: URL_SAFE_NO_PAD.encode(y),
        }
    }

    pub fn to_verifying_key(&self) -> Result<VerifyingKey, SrcpError> {
        let x = URL_SAFE_NO_PAD
            .decode(&self.x)
            .map_err(|e| SrcpError::Other(format!("invalid JWK x coordinate: {e}")))?;
        let y = URL_SAFE_NO_PAD
            .decode(&self.y)
            .map_err(|e| SrcpError::Other(format!("invalid JWK y coordinate: {e}")))?;
        let point = p256::EncodedPoint::from_affine_coordinates(
            x.as_slice().into(),
            y.as_slice().into(),
            false,
        );
        VerifyingKey::from_encoded_point(&point)
            .map_err(|_| SrcpError::Other("invalid P-256 point in JWK".to_string()))
    }

    /// The canonical byte form used as input to the DID derivation hash.
    /// Field order is fixed (`crv`, `kty`, `x`, `y` — lexicographic), not
    /// struct declaration order, since canonicalisation always sorts keys.
    pub fn canonical(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("crv", CanonicalValue::str(&self.crv)),
            ("kty", CanonicalValue::str(&self.kty)),
            ("x", CanonicalValue::str(&self.x)),
            ("y", CanonicalValue::str(&self.y)),
        ])
    }
}

impl Drop for PrivateKeyJwk {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.d.zeroize();
    }
}

impl PrivateKeyJwk {
    pub fn from_signing_key(key: &SigningKey) -> Self {
        let public = PublicKeyJwk::from_verifying_key(key.verifying_key());
        let d = URL_SAFE_NO_PAD.encode(key.to_bytes());
        Self {
            kty: public.kty,
            crv: public.crv,
            x: public.x,
            y: public.y,
            d,
        }
    }

    pub fn to_signing_key(&self) -> Result<SigningKey, SrcpError> {
        let d = URL_SAFE_NO_PAD
            .decode(&self.d)
            .map_err(|e| SrcpError::Other(format!("invalid JWK d coordinate: {e}")))?;
        SigningKey::from_slice(&d)
            .map_err(|_| SrcpError::Other("invalid P-256 scalar in JWK".to_string()))
    }

    pub fn public(&self) -> PublicKeyJwk {
        PublicKeyJwk {
            kty: self.kty.clone(),
            crv: self.crv.clone(),
            x: self.x.clone(),
            y: self.y.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_jwk_round_trips_through_verifying_key() {
        let signing = SigningKey::random(&mut rand_core::OsRng);
        let jwk = PublicKeyJwk::from_verifying_key(signing.verifying_key());
        let recovered = jwk.to_verifying_key().unwrap();
        assert_eq!(&recovered, signing.verifying_key());
    }

    #[test]
    fn private_jwk_round_trips_through_signing_key() {
        let signing = SigningKey::random(&mut rand_core::OsRng);
        let jwk = PrivateKeyJwk::from_signing_key(&signing);
        let recovered = jwk.to_signing_key().unwrap();
        assert_eq!(recovered.to_bytes(), signing.to_bytes());
    }
}
