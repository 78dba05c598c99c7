use serde_json::Value as JsonValue;
use srcp_adapters::{Clock, Logger, NonceSource, SubstrateGuard};
use srcp_core::{CanonicalValue, Did, HexHash, SrcpError, SrcpResult, Timestamp};
use srcp_crypto::{canonical_hash_hex, Identity};
use srcp_ledger::{ChainVerification, Ledger, Transaction};

use crate::config::KernelConfig;
use crate::export::{exported_state_signable, ExportedIdentityRef, ExportedState, KernelExport};
use crate::snapshot::{KernelState, KERNEL_VERSION};

/// The adapters a kernel needs injected at boot: a source of logical
/// time, a source of fresh nonces, and a log sink. Nothing in
/// `srcp-kernel` reads the host clock or RNG by any other path.
pub struct KernelAdapters {
    pub clock: Box<dyn Clock>,
    pub nonce: Box<dyn NonceSource>,
    pub logger: Box<dyn Logger>,
}

pub struct BootOptions {
    pub adapters: KernelAdapters,
    pub identity: Option<Identity>,
    pub config: KernelConfig,
}

/// What applying one transaction hands back to the caller: the stored
/// transaction (hash, signature, everything) and the state snapshot it
/// produced.
pub struct ExecutionReceipt {
    pub transaction: Transaction,
    pub state: KernelState,
}

/// Result of [`Kernel::verify_integrity`]: a from-scratch recomputation
/// of the ledger chain and the running state hash, checked against what
/// the kernel currently holds.
pub struct IntegrityReport {
    pub valid: bool,
    pub chain: ChainVerification,
    pub state_hash_matches: bool,
}

/// The kernel: an identity, a ledger, and a running state snapshot, tied
/// together by a single-threaded, adapter-driven execution loop.
pub struct Kernel {
    adapters: KernelAdapters,
    identity: Option<Identity>,
    genesis_did: Option<Did>,
    ledger: Ledger,
    boot_time: Timestamp,
    state: KernelState,
    sealed: bool,
    _substrate_guard: SubstrateGuard,
}

fn boot_params(genesis_did: &Option<Did>, boot_time: Timestamp) -> CanonicalValue {
    CanonicalValue::object([
        (
            "did",
            match genesis_did {
                Some(did) => CanonicalValue::str(did.clone()),
                None => CanonicalValue::Null,
            },
        ),
        ("boot_time", CanonicalValue::int(boot_time)),
        ("version", CanonicalValue::str(KERNEL_VERSION)),
    ])
}

impl Kernel {
    /// Bring a kernel up: engage the substrate lock for its lifetime,
    /// read a single timestamp from the clock adapter to stamp genesis,
    /// and publish the boot snapshot.
    pub fn boot(options: BootOptions) -> SrcpResult<Kernel> {
        let BootOptions {
            adapters,
            identity,
            config,
        } = options;
        let genesis_did = identity.as_ref().map(|id| id.did().clone());
        Self::boot_with_genesis(adapters, identity, genesis_did, config)
    }

    /// Shared boot path for [`Kernel::boot`] and [`Kernel::replay`]: the
    /// genesis DID that feeds `state_hash_0` is taken as an explicit
    /// argument rather than always derived from `identity`, so a replay
    /// can reproduce the original genesis hash without needing the
    /// original signing identity in hand.
    fn boot_with_genesis(
        adapters: KernelAdapters,
        identity: Option<Identity>,
        genesis_did: Option<Did>,
        config: KernelConfig,
    ) -> SrcpResult<Kernel> {
        let guard = SubstrateGuard::engage(config.lock_date, config.lock_math);
        tracing::info!("kernel boot starting");
        adapters.logger.log("boot: starting");

        let boot_time = adapters.clock.now();
        let state_hash = canonical_hash_hex(&boot_params(&genesis_did, boot_time));

        let state = KernelState {
            version: KERNEL_VERSION.to_string(),
            logical_time: boot_time,
            transaction_count: 0,
            identity_ref: genesis_did.clone(),
            ledger_head_hash: srcp_core::types::genesis_hash_placeholder(),
            state_hash,
        };

        tracing::info!(logical_time = boot_time, "kernel boot complete");
        adapters
            .logger
            .log(&format!("boot: complete at logical_time={boot_time}"));

        Ok(Kernel {
            adapters,
            identity,
            genesis_did,
            ledger: Ledger::new(),
            boot_time,
            state,
            sealed: false,
            _substrate_guard: guard,
        })
    }

    /// Build, optionally sign, and commit a new transaction: mint a
    /// nonce and timestamp from the injected adapters, sign with the
    /// kernel's identity if one was supplied at boot, append to the
    /// ledger, and publish the resulting state snapshot.
    ///
    /// Every precondition (not sealed, clock strictly advancing) is
    /// checked before any field of `self` changes, so a rejected call
    /// leaves the kernel exactly as it was.
    pub fn execute_transaction(
        &mut self,
        tx_type: &str,
        payload: CanonicalValue,
    ) -> SrcpResult<ExecutionReceipt> {
        if self.sealed {
            return Err(SrcpError::Sealed);
        }

        let timestamp = self.adapters.clock.now();
        if timestamp <= self.state.logical_time {
            return Err(SrcpError::ClockRegression {
                previous: self.state.logical_time,
                new: timestamp,
            });
        }
        let nonce = self.adapters.nonce.generate();

        let issuer_did: Did = self
            .identity
            .as_ref()
            .map(|id| id.did().clone())
            .unwrap_or_default();

        let payload_json = canonical_to_json(&payload);
        let mut tx = Transaction::new(tx_type, payload_json, nonce, timestamp, issuer_did);
        if let Some(identity) = &self.identity {
            let signature = identity.sign(&tx.signable_value());
            tx = tx.with_signature(signature);
        }

        self.commit(tx)
    }

    /// Boot a fresh kernel and re-apply a previously recorded
    /// transaction log in order, using each transaction's own stored
    /// nonce and timestamp rather than querying the adapters for them.
    /// The clock/nonce adapters are still used for the boot snapshot.
    ///
    /// `genesis_did` is the DID the original kernel booted with (e.g.
    /// from a prior `export().state.identity.did`), independent of
    /// whether `identity` — which only governs signing of *new*
    /// transactions executed after replay completes — is supplied at
    /// all. Passing the wrong `genesis_did` reproduces a different
    /// `state_hash_0` and every state hash after it.
    pub fn replay(
        log: &[Transaction],
        adapters: KernelAdapters,
        identity: Option<Identity>,
        genesis_did: Option<Did>,
        config: KernelConfig,
    ) -> SrcpResult<Kernel> {
        let mut kernel = Kernel::boot_with_genesis(adapters, identity, genesis_did, config)?;
        for tx in log {
            kernel.commit(tx.clone())?;
        }
        Ok(kernel)
    }

    fn commit(&mut self, tx: Transaction) -> SrcpResult<ExecutionReceipt> {
        if self.sealed {
            return Err(SrcpError::Sealed);
        }
        if tx.timestamp <= self.state.logical_time {
            return Err(SrcpError::ClockRegression {
                previous: self.state.logical_time,
                new: tx.timestamp,
            });
        }

        let tx_hash = tx.hash.clone();
        let tx_timestamp = tx.timestamp;
        self.ledger.append(tx.clone())?;

        let step = CanonicalValue::object([
            ("prev", CanonicalValue::str(&self.state.state_hash)),
            ("tx_hash", CanonicalValue::str(&tx_hash)),
        ]);
        let state_hash = canonical_hash_hex(&step);

        self.state = KernelState {
            version: self.state.version.clone(),
            logical_time: tx_timestamp,
            transaction_count: self.state.transaction_count + 1,
            identity_ref: self.state.identity_ref.clone(),
            ledger_head_hash: self.ledger.head_hash(),
            state_hash,
        };

        tracing::info!(tx_hash = %tx_hash, logical_time = tx_timestamp, "transaction committed");
        self.adapters.logger.log(&format!(
            "execute_transaction: committed {} at logical_time={}",
            tx_hash, tx_timestamp
        ));

        Ok(ExecutionReceipt {
            transaction: tx,
            state: self.state.clone(),
        })
    }

    /// Recompute the ledger chain and the running state hash from
    /// scratch and compare against what the kernel currently holds.
    pub fn verify_integrity(&self) -> IntegrityReport {
        let chain = self.ledger.verify();

        let mut state_hash = canonical_hash_hex(&boot_params(&self.genesis_did, self.boot_time));
        for entry in self.ledger.entries() {
            let step = CanonicalValue::object([
                ("prev", CanonicalValue::str(&state_hash)),
                ("tx_hash", CanonicalValue::str(&entry.tx.hash)),
            ]);
            state_hash = canonical_hash_hex(&step);
        }
        let state_hash_matches = state_hash == self.state.state_hash;

        IntegrityReport {
            valid: chain.all_valid && state_hash_matches,
            chain,
            state_hash_matches,
        }
    }

    /// Permanently stop accepting new transactions. Reads, including
    /// `export`/`verify_integrity`, remain available afterwards.
    pub fn seal(&mut self) {
        self.sealed = true;
        tracing::info!("kernel sealed");
        self.adapters.logger.log("seal: kernel sealed, no further writes accepted");
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Produce a portable export blob: the current state summary plus
    /// the full transaction log, signed by the kernel's identity when
    /// one is present.
    pub fn export(&self) -> KernelExport {
        let identity_ref = self.identity.as_ref().map(|id| ExportedIdentityRef {
            did: id.did().clone(),
            public_key_jwk: id.public_key_jwk(),
        });

        let state = ExportedState {
            version: self.state.version.clone(),
            boot_time: self.boot_time,
            logical_time: self.state.logical_time,
            transaction_count: self.state.transaction_count,
            identity: identity_ref,
            state_hash: self.state.state_hash.clone(),
            ledger_head_hash: self.state.ledger_head_hash.clone(),
        };

        let signature = self
            .identity
            .as_ref()
            .map(|id| id.sign(&exported_state_signable(&state)));

        KernelExport {
            version: KERNEL_VERSION.to_string(),
            state,
            transactions: self.ledger.entries().iter().map(|e| e.tx.clone()).collect(),
            signature,
        }
    }

    pub fn verify_export(blob: &KernelExport) -> crate::export::ExportVerification {
        crate::export::verify_export(blob)
    }

    pub fn current_state(&self) -> &KernelState {
        &self.state
    }

    pub fn head_hash(&self) -> HexHash {
        self.ledger.head_hash()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

fn canonical_to_json(value: &CanonicalValue) -> JsonValue {
    match value {
        CanonicalValue::Null => JsonValue::Null,
        CanonicalValue::Bool(b) => JsonValue::Bool(*b),
        CanonicalValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        CanonicalValue::String(s) => JsonValue::String(s.clone()),
        CanonicalValue::Array(items) => JsonValue::Array(items.iter().map(canonical_to_json).collect()),
        CanonicalValue::Object(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), canonical_to_json(v)))
                .collect(),
        ),
    }
}
