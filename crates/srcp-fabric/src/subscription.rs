use srcp_core::{SrcpError, Timestamp};

use crate::event::{Category, Event};

/// Where a subscription listens. A tagged variant per the fabric's three
/// routing shapes, rather than string-prefix checks scattered through
/// dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    Exact { category: Category, ty: String },
    CategoryWildcard { category: Category },
    Global,
}

impl Pattern {
    pub fn matches(&self, category: Category, ty: &str) -> bool {
        match self {
            Pattern::Exact { category: c, ty: t } => *c == category && t == ty,
            Pattern::CategoryWildcard { category: c } => *c == category,
            Pattern::Global => true,
        }
    }

    /// Higher is more specific. Not used to decide whether a pattern
    /// matches, only to describe matches in logs and tests.
    pub fn specificity(&self) -> u8 {
        match self {
            Pattern::Exact { .. } => 2,
            Pattern::CategoryWildcard { .. } => 1,
            Pattern::Global => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubscriptionOptions {
    /// At most one invocation per this many ticks of `clock.now()`.
    /// `None` means unlimited.
    pub rate_limit_ticks: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// A registered listener: a pattern to match against, a handler to run,
/// and enough state to enforce its own rate limit.
pub struct Subscription {
    pub id: SubscriptionId,
    pub pattern: Pattern,
    pub options: SubscriptionOptions,
    pub handler: Box<dyn FnMut(&Event) -> Result<(), SrcpError> + Send>,
    pub last_invocation_tick: Option<Timestamp>,
}

impl Subscription {
    /// Whether this subscription's rate limit permits invocation at
    /// `tick`. Does not mutate `last_invocation_tick` — the caller
    /// records that only after a successful dispatch decision.
    pub fn permits(&self, tick: Timestamp) -> bool {
        match (self.options.rate_limit_ticks, self.last_invocation_tick) {
            (Some(k), Some(last)) => tick - last >= k,
            _ => true,
        }
    }
}
