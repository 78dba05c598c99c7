use serde::{Deserialize, Serialize};
use srcp_core::{types::genesis_hash_placeholder, HexHash, SrcpError};
use std::collections::HashSet;

use crate::entry::LedgerEntry;
use crate::transaction::Transaction;

/// Result of [`Ledger::verify`]: a walk of the chain recomputing every
/// `entry_hash`, reporting the first break rather than raising.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainVerification {
    pub all_valid: bool,
    pub first_invalid_index: Option<usize>,
}

/// Append-only, hash-chained transaction log.
///
/// `append` enforces the two ledger-level preconditions from spec §4.D:
/// nonce uniqueness and hash-recomputation integrity. Everything else
/// (parent linkage, `entry_hash` derivation) is pure function of the
/// sequence already appended, so the whole chain is reproducible from the
/// transaction sequence alone (spec §3.3 invariant).
#[derive(Default)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    seen_nonces: HashSet<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from an already-chained entry sequence, e.g. when
    /// reconstructing from an export blob. Does not re-verify the chain —
    /// call [`Ledger::verify`] afterwards if that is required.
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        let seen_nonces = entries.iter().map(|e| e.tx.nonce.clone()).collect();
        Self {
            entries,
            seen_nonces,
        }
    }

    pub fn append(&mut self, tx: Transaction) -> Result<&LedgerEntry, SrcpError> {
        if self.seen_nonces.contains(&tx.nonce) {
            return Err(SrcpError::ReplayAttack(tx.nonce.clone()));
        }
        if !tx.is_hash_valid() {
            return Err(SrcpError::Other(
                "transaction hash does not match recomputation".to_string(),
            ));
        }

        let prev_hash = self.head_hash();
        let index = self.entries.len();
        self.seen_nonces.insert(tx.nonce.clone());
        let entry = LedgerEntry::new(index, tx, prev_hash);
        self.entries.push(entry);
        Ok(self.entries.last().expect("entry was just pushed"))
    }

    pub fn verify(&self) -> ChainVerification {
        let mut expected_prev = genesis_hash_placeholder();
        for entry in &self.entries {
            if entry.prev_hash != expected_prev || entry.entry_hash != entry.recompute_entry_hash() {
                return ChainVerification {
                    all_valid: false,
                    first_invalid_index: Some(entry.index),
                };
            }
            expected_prev = entry.entry_hash.clone();
        }
        ChainVerification {
            all_valid: true,
            first_invalid_index: None,
        }
    }

    pub fn head_hash(&self) -> HexHash {
        self.entries
            .last()
            .map(|e| e.entry_hash.clone())
            .unwrap_or_else(genesis_hash_placeholder)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_nonce(&self, nonce: &str) -> bool {
        self.seen_nonces.contains(nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use srcp_adapters::{Clock, NonceSource, TestClock, TestNonce};

    fn tx(clock: &TestClock, nonce: &TestNonce) -> Transaction {
        Transaction::new(
            "ledger.append",
            json!({"value": 42}),
            nonce.generate(),
            clock.now(),
            "did:srcp:tester".to_string(),
        )
    }

    #[test]
    fn genesis_entry_uses_placeholder_prev_hash() {
        let clock = TestClock::new(1000);
        let nonce = TestNonce::new(0);
        let mut ledger = Ledger::new();
        ledger.append(tx(&clock, &nonce)).unwrap();
        assert_eq!(ledger.entries()[0].prev_hash, genesis_hash_placeholder());
    }

    #[test]
    fn indices_are_dense_from_zero() {
        let clock = TestClock::new(1000);
        let nonce = TestNonce::new(0);
        let mut ledger = Ledger::new();
        for _ in 0..5 {
            ledger.append(tx(&clock, &nonce)).unwrap();
        }
        for (i, e) in ledger.entries().iter().enumerate() {
            assert_eq!(e.index, i);
        }
    }

    #[test]
    fn prev_hash_chains_to_previous_entry_hash() {
        let clock = TestClock::new(1000);
        let nonce = TestNonce::new(0);
        let mut ledger = Ledger::new();
        ledger.append(tx(&clock, &nonce)).unwrap();
        ledger.append(tx(&clock, &nonce)).unwrap();
        assert_eq!(ledger.entries()[1].prev_hash, ledger.entries()[0].entry_hash);
    }

    #[test]
    fn duplicate_nonce_is_rejected() {
        let clock = TestClock::new(1000);
        let mut ledger = Ledger::new();
        let a = Transaction::new("t", json!({}), "dup".into(), clock.now(), "did:srcp:a".into());
        let b = Transaction::new("t", json!({}), "dup".into(), clock.now(), "did:srcp:a".into());
        ledger.append(a).unwrap();
        assert!(matches!(ledger.append(b), Err(SrcpError::ReplayAttack(_))));
    }

    #[test]
    fn verify_reports_first_broken_entry() {
        let clock = TestClock::new(1000);
        let nonce = TestNonce::new(0);
        let mut ledger = Ledger::new();
        for _ in 0..3 {
            ledger.append(tx(&clock, &nonce)).unwrap();
        }
        assert!(ledger.verify().all_valid);

        let mut entries = ledger.entries().to_vec();
        entries[1].entry_hash = "tampered".to_string();
        let broken = Ledger::from_entries(entries);
        let report = broken.verify();
        assert!(!report.all_valid);
        assert_eq!(report.first_invalid_index, Some(1));
    }

    #[test]
    fn head_hash_of_empty_ledger_is_genesis_placeholder() {
        let ledger = Ledger::new();
        assert_eq!(ledger.head_hash(), genesis_hash_placeholder());
    }
}
