pub mod event;
pub mod fabric;
pub mod metrics;
pub mod queue;
pub mod subscription;

pub use event::{Category, Event, Priority};
pub use fabric::{EmitOptions, EventFabric, EventQuery, FabricAdapters, FabricExport, FabricState};
pub use metrics::{FabricMetrics, FlushReport};
pub use queue::PriorityQueue;
pub use subscription::{Pattern, Subscription, SubscriptionId, SubscriptionOptions};
