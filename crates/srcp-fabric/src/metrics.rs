use serde::{Deserialize, Serialize};

/// Running counters for a fabric instance. Reset only by
/// [`crate::fabric::EventFabric::import`] replacing them wholesale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricMetrics {
    pub emitted: u64,
    pub dispatched: u64,
    pub rate_limited: u64,
    pub handler_errors: u64,
}

/// What one `flush()` call did, on top of the running totals in
/// [`FabricMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub dispatched: u64,
    pub rate_limited: u64,
    pub handler_errors: u64,
}
