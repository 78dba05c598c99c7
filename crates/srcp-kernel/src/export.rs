use serde::{Deserialize, Serialize};
use srcp_core::{CanonicalValue, Did, HexHash, Timestamp};
use srcp_crypto::{canonical_hash_hex, Identity, PublicKeyJwk};
use srcp_ledger::{ChainVerification, Ledger, Transaction};

/// Identity summary carried in an export blob: enough to verify
/// transaction signatures, never the private key.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportedIdentityRef {
    pub did: Did,
    pub public_key_jwk: PublicKeyJwk,
}

/// The `state` sub-object of a kernel export blob.
///
/// `boot_time` travels with the blob so `verify_export` can re-derive
/// the genesis state hash from the blob alone, without access to the
/// original adapters. See DESIGN.md, "Open Questions".
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportedState {
    pub version: String,
    pub boot_time: Timestamp,
    pub logical_time: Timestamp,
    pub transaction_count: u64,
    pub identity: Option<ExportedIdentityRef>,
    pub state_hash: HexHash,
    pub ledger_head_hash: HexHash,
}

/// The full kernel export blob: the latest state snapshot plus the full
/// transaction log it was derived from, optionally signed by the
/// kernel's own identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KernelExport {
    pub version: String,
    pub state: ExportedState,
    pub transactions: Vec<Transaction>,
    pub signature: Option<String>,
}

/// The canonical value an export blob's top-level `signature` covers:
/// the state summary, but never the transaction list itself (each
/// transaction already carries, and is covered by, its own signature).
pub fn exported_state_signable(state: &ExportedState) -> CanonicalValue {
    CanonicalValue::object([
        (
            "did",
            match &state.identity {
                Some(id) => CanonicalValue::str(&id.did),
                None => CanonicalValue::Null,
            },
        ),
        ("boot_time", CanonicalValue::int(state.boot_time)),
        ("ledger_head_hash", CanonicalValue::str(&state.ledger_head_hash)),
        ("logical_time", CanonicalValue::int(state.logical_time)),
        ("state_hash", CanonicalValue::str(&state.state_hash)),
        ("transaction_count", CanonicalValue::int(state.transaction_count as i64)),
        ("version", CanonicalValue::str(&state.version)),
    ])
}

/// Result of [`crate::Kernel::verify_export`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportVerification {
    pub valid: bool,
    pub reason: Option<String>,
}

impl ExportVerification {
    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }

    fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }
}

/// Reconstruct state purely from `blob.transactions` and check ledger
/// chain consistency, the `state_hash` match, and every signature
/// (per-transaction and, if present, the blob's own). A sealed kernel
/// still exports and verifies; sealing only blocks further writes.
pub fn verify_export(blob: &KernelExport) -> ExportVerification {
    if blob.transactions.len() as u64 != blob.state.transaction_count {
        return ExportVerification::invalid(format!(
            "transaction_count mismatch: declared {}, found {}",
            blob.state.transaction_count,
            blob.transactions.len()
        ));
    }

    let mut ledger = Ledger::new();
    for tx in &blob.transactions {
        if ledger.append(tx.clone()).is_err() {
            return ExportVerification::invalid(format!(
                "ledger rejected transaction with nonce {}",
                tx.nonce
            ));
        }
    }

    let chain: ChainVerification = ledger.verify();
    if !chain.all_valid {
        return ExportVerification::invalid(format!(
            "ledger chain broken at index {:?}",
            chain.first_invalid_index
        ));
    }

    if ledger.head_hash() != blob.state.ledger_head_hash {
        return ExportVerification::invalid("ledger_head_hash does not match reconstructed chain");
    }

    let boot_params = CanonicalValue::object([
        ("did", match &blob.state.identity {
            Some(id) => CanonicalValue::str(&id.did),
            None => CanonicalValue::Null,
        }),
        ("boot_time", CanonicalValue::int(blob.state.boot_time)),
        ("version", CanonicalValue::str(&blob.state.version)),
    ]);
    let mut state_hash = canonical_hash_hex(&boot_params);
    for entry in ledger.entries() {
        let step = CanonicalValue::object([
            ("prev", CanonicalValue::str(&state_hash)),
            ("tx_hash", CanonicalValue::str(&entry.tx.hash)),
        ]);
        state_hash = canonical_hash_hex(&step);
    }

    if state_hash != blob.state.state_hash {
        return ExportVerification::invalid("state_hash does not match recomputed chain");
    }

    if let Some(identity_ref) = &blob.state.identity {
        for tx in &blob.transactions {
            if let Some(sig) = &tx.signature {
                if !Identity::verify(&identity_ref.public_key_jwk, &tx.signable_value(), sig) {
                    return ExportVerification::invalid(format!(
                        "signature verification failed for transaction {}",
                        tx.hash
                    ));
                }
            }
        }

        if let Some(blob_sig) = &blob.signature {
            let signable = exported_state_signable(&blob.state);
            if !Identity::verify(&identity_ref.public_key_jwk, &signable, blob_sig) {
                return ExportVerification::invalid("export blob signature does not verify");
            }
        }
    }

    ExportVerification::valid()
}
