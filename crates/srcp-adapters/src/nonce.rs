use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A source of fresh, unique tokens. The kernel's replay-protection
/// invariant depends entirely on this adapter never repeating a value
/// during a single kernel's lifetime.
pub trait NonceSource: Send + Sync {
    fn generate(&self) -> String;
}

/// Deterministic, strictly-incrementing nonce source for tests and
/// replay: `"test-nonce-{start}"`, `"test-nonce-{start+1}"`, ...
pub struct TestNonce {
    next: AtomicU64,
}

impl TestNonce {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl NonceSource for TestNonce {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        format!("test-nonce-{n}")
    }
}

/// A nonce source that always returns the same value — used by tests
/// exercising `ReplayAttack` rejection (spec scenario S2).
pub struct ConstantNonce {
    value: String,
}

impl ConstantNonce {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl NonceSource for ConstantNonce {
    fn generate(&self) -> String {
        self.value.clone()
    }
}

/// A nonce source backed by a fixed, caller-supplied sequence — used during
/// replay, where nonces must come from the stored transaction log.
pub struct FixedNonce {
    values: Mutex<std::vec::IntoIter<String>>,
}

impl FixedNonce {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values: Mutex::new(values.into_iter()),
        }
    }
}

impl NonceSource for FixedNonce {
    fn generate(&self) -> String {
        self.values
            .lock()
            .expect("FixedNonce mutex poisoned")
            .next()
            .expect("FixedNonce exhausted: more generate() calls than supplied values")
    }
}
