use thiserror::Error;

/// Stable error-kind identifiers shared across every `srcp-*` crate.
///
/// Invariant violations (`Sealed`, `ReplayAttack`, `ClockRegression`,
/// `SubstrateViolation`) abort the operation that produced them with no
/// partial state visible to the caller. Verification failures
/// (`InvalidSignature`, `ChainBroken`) are reported as plain data from
/// verification APIs rather than raised — callers that need the
/// `Err`-shaped variant here are constructing one explicitly for a
/// different call path (e.g. signature verification *during* transaction
/// execution, as opposed to the standalone `verify` query).
#[derive(Debug, Error)]
pub enum SrcpError {
    #[error("kernel is sealed")]
    Sealed,

    #[error("nonce already used: {0}")]
    ReplayAttack(String),

    #[error("clock regression: new timestamp {new} <= previous {previous}")]
    ClockRegression { previous: i64, new: i64 },

    #[error("substrate violation: {0}")]
    SubstrateViolation(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("ledger chain broken at index {0}")]
    ChainBroken(usize),

    #[error("required adapter missing: {0}")]
    AdapterMissing(&'static str),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Other(String),
}

pub type SrcpResult<T> = Result<T, SrcpError>;
