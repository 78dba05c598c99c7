use serde::{Deserialize, Serialize};
use srcp_core::{Did, HexHash, Timestamp};

/// The kernel's wire-format version. Bumped only on breaking changes to
/// the export blob shape.
pub const KERNEL_VERSION: &str = "1.0.0";

/// An immutable snapshot of kernel state, published once at boot and
/// again after every applied transaction.
///
/// `Kernel` only ever hands out shared references to the snapshot it
/// currently holds (`Kernel::current_state`). There is no `&mut
/// KernelState` anywhere in the public API, so mutating a published
/// snapshot is a compile error rather than a runtime check.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct KernelState {
    pub version: String,
    pub logical_time: Timestamp,
    pub transaction_count: u64,
    pub identity_ref: Option<Did>,
    pub ledger_head_hash: HexHash,
    pub state_hash: HexHash,
}
