use serde::{Deserialize, Serialize};
use srcp_core::{CanonicalValue, Did, HexHash, Nonce, Timestamp};
use srcp_crypto::canonical_hash_hex;

/// A single state-changing operation recorded in the ledger.
///
/// `tx_type`/`payload` are opaque to the kernel — it records, chains, and
/// hashes them without interpreting what they mean (spec §4.E). `hash` is
/// a pure function of every field except `signature`, which is never
/// covered by the hash (spec §3.2).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub tx_type: String,
    pub payload: serde_json::Value,
    pub nonce: Nonce,
    pub timestamp: Timestamp,
    pub issuer_did: Did,
    pub signature: Option<String>,
    pub hash: HexHash,
}

impl Transaction {
    /// Build a new transaction and compute its `hash` immediately. The
    /// transaction is unsigned until [`Transaction::with_signature`] is
    /// called — an absence of a signature is recorded explicitly rather
    /// than implied (spec §9 Open Question (a)).
    pub fn new(
        tx_type: impl Into<String>,
        payload: serde_json::Value,
        nonce: Nonce,
        timestamp: Timestamp,
        issuer_did: Did,
    ) -> Self {
        let tx_type = tx_type.into();
        let hash = compute_hash(&tx_type, &payload, &nonce, timestamp, &issuer_did);
        Self {
            tx_type,
            payload,
            nonce,
            timestamp,
            issuer_did,
            signature: None,
            hash,
        }
    }

    pub fn with_signature(mut self, signature: String) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Recompute `hash` from the current fields (everything but
    /// `signature`). Used to detect tampering: a transaction whose stored
    /// `hash` no longer matches this recomputation has been corrupted.
    pub fn recompute_hash(&self) -> HexHash {
        compute_hash(
            &self.tx_type,
            &self.payload,
            &self.nonce,
            self.timestamp,
            &self.issuer_did,
        )
    }

    pub fn is_hash_valid(&self) -> bool {
        self.recompute_hash() == self.hash
    }

    /// The canonical value this transaction's signature is computed over:
    /// identical to the hash body, so signing and hashing agree on what
    /// "this transaction" means.
    pub fn signable_value(&self) -> CanonicalValue {
        canonical_body(&self.tx_type, &self.payload, &self.nonce, self.timestamp, &self.issuer_did)
    }
}

fn canonical_body(
    tx_type: &str,
    payload: &serde_json::Value,
    nonce: &str,
    timestamp: Timestamp,
    issuer_did: &str,
) -> CanonicalValue {
    CanonicalValue::object([
        ("issuer_did", CanonicalValue::str(issuer_did)),
        ("nonce", CanonicalValue::str(nonce)),
        ("payload", CanonicalValue::from(payload)),
        ("timestamp", CanonicalValue::int(timestamp)),
        ("type", CanonicalValue::str(tx_type)),
    ])
}

fn compute_hash(
    tx_type: &str,
    payload: &serde_json::Value,
    nonce: &str,
    timestamp: Timestamp,
    issuer_did: &str,
) -> HexHash {
    canonical_hash_hex(&canonical_body(tx_type, payload, nonce, timestamp, issuer_did))
}
