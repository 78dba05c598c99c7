use serde::{Deserialize, Serialize};
use srcp_core::{CanonicalValue, Did, Timestamp};

/// The closed set of event categories. Unlike transaction `type`, which is
/// opaque free text, `Category` is a fixed enum: the fabric's routing
/// table keys off it directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Kernel,
    Ledger,
    Identity,
    Economic,
    App,
    Security,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Kernel => "KERNEL",
            Category::Ledger => "LEDGER",
            Category::Identity => "IDENTITY",
            Category::Economic => "ECONOMIC",
            Category::App => "APP",
            Category::Security => "SECURITY",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatch priority. Declaration order doubles as numeric order, so the
/// derived `Ord` already sorts `Critical < High < Normal < Low` the way
/// the priority queue needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Critical = 0,
    High = 1,
    Normal = 2,
    Low = 3,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// A single message routed through the fabric.
///
/// `is_replay` is `false` for every event as emitted and recorded in the
/// log; [`crate::fabric::EventFabric::replay`] hands handlers a copy with
/// the flag flipped, without touching the stored log entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub category: Category,
    #[serde(rename = "type")]
    pub ty: String,
    pub payload: serde_json::Value,
    pub timestamp: Timestamp,
    pub priority: Priority,
    pub issuer_did: Option<Did>,
    pub signature: Option<String>,
    pub is_replay: bool,
}

impl Event {
    /// The canonical value an event's signature covers: everything but
    /// `signature` and `is_replay`, the latter being dispatch context
    /// rather than part of the event's identity.
    pub fn signable_value(&self) -> CanonicalValue {
        CanonicalValue::object([
            ("category", CanonicalValue::str(self.category.as_str())),
            ("id", CanonicalValue::str(&self.id)),
            (
                "issuer_did",
                match &self.issuer_did {
                    Some(did) => CanonicalValue::str(did),
                    None => CanonicalValue::Null,
                },
            ),
            ("payload", CanonicalValue::from(&self.payload)),
            ("priority", CanonicalValue::int(self.priority as i64)),
            ("timestamp", CanonicalValue::int(self.timestamp)),
            ("type", CanonicalValue::str(&self.ty)),
        ])
    }

    pub fn replay_copy(&self) -> Event {
        let mut copy = self.clone();
        copy.is_replay = true;
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_ordering_matches_the_numeric_ranking() {
        assert!(Priority::Critical < Priority::High);
        assert!(Priority::High < Priority::Normal);
        assert!(Priority::Normal < Priority::Low);
    }

    #[test]
    fn replay_copy_sets_the_flag_without_mutating_the_original() {
        let event = Event {
            id: "e1".into(),
            category: Category::App,
            ty: "thing.happened".into(),
            payload: serde_json::json!({}),
            timestamp: 1,
            priority: Priority::Normal,
            issuer_did: None,
            signature: None,
            is_replay: false,
        };
        let copy = event.replay_copy();
        assert!(copy.is_replay);
        assert!(!event.is_replay);
    }
}
