use serde::{Deserialize, Serialize};
use srcp_core::{CanonicalValue, HexHash};
use srcp_crypto::canonical_hash_hex;

use crate::transaction::Transaction;

/// One append-only ledger entry wrapping a transaction with its position
/// in the hash chain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub index: usize,
    pub tx: Transaction,
    pub prev_hash: HexHash,
    pub entry_hash: HexHash,
}

impl LedgerEntry {
    pub fn new(index: usize, tx: Transaction, prev_hash: HexHash) -> Self {
        let entry_hash = compute_entry_hash(index, &tx.hash, &prev_hash);
        Self {
            index,
            tx,
            prev_hash,
            entry_hash,
        }
    }

    pub fn recompute_entry_hash(&self) -> HexHash {
        compute_entry_hash(self.index, &self.tx.hash, &self.prev_hash)
    }
}

fn compute_entry_hash(index: usize, tx_hash: &str, prev_hash: &str) -> HexHash {
    let value = CanonicalValue::object([
        ("entry_hash_prev", CanonicalValue::str(prev_hash)),
        ("index", CanonicalValue::int(index as i64)),
        ("tx_hash", CanonicalValue::str(tx_hash)),
    ]);
    canonical_hash_hex(&value)
}
