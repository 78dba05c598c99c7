use serde::{Deserialize, Serialize};
use srcp_adapters::{Clock, Logger, NonceSource};
use srcp_core::{Did, SrcpError, SrcpResult, Timestamp};
use srcp_crypto::Identity;

use crate::event::{Category, Event, Priority};
use crate::metrics::{FabricMetrics, FlushReport};
use crate::queue::PriorityQueue;
use crate::subscription::{Pattern, Subscription, SubscriptionId, SubscriptionOptions};

/// Terminal lifecycle states mirroring the kernel's own boot/seal model,
/// kept independent of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FabricState {
    Running,
    Sealed,
}

pub struct FabricAdapters {
    pub clock: Box<dyn Clock>,
    pub nonce: Box<dyn NonceSource>,
    pub logger: Box<dyn Logger>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EmitOptions {
    pub priority: Option<Priority>,
}

#[derive(Clone, Debug, Default)]
pub struct EventQuery {
    pub category: Option<Category>,
    pub ty: Option<String>,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FabricExport {
    pub version: String,
    pub events: Vec<Event>,
    pub metrics: FabricMetrics,
}

/// Deterministic in-process pub/sub: priority-ordered dispatch, optional
/// signing, rate limiting, and a monotonic event log that can be
/// exported, imported, and replayed.
pub struct EventFabric {
    adapters: FabricAdapters,
    identity: Option<Identity>,
    state: FabricState,
    queue: PriorityQueue,
    subscriptions: Vec<Subscription>,
    next_subscription_id: u64,
    log: Vec<Event>,
    metrics: FabricMetrics,
}

impl EventFabric {
    pub fn new(adapters: FabricAdapters, identity: Option<Identity>) -> Self {
        Self {
            adapters,
            identity,
            state: FabricState::Running,
            queue: PriorityQueue::new(),
            subscriptions: Vec::new(),
            next_subscription_id: 0,
            log: Vec::new(),
            metrics: FabricMetrics::default(),
        }
    }

    pub fn subscribe(
        &mut self,
        pattern: Pattern,
        options: SubscriptionOptions,
        handler: Box<dyn FnMut(&Event) -> Result<(), SrcpError> + Send>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscriptions.push(Subscription {
            id,
            pattern,
            options,
            handler,
            last_invocation_tick: None,
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Assign an id and timestamp, optionally sign, append to the log,
    /// and enqueue for dispatch. Fails with `Sealed` before anything is
    /// touched if the fabric is sealed.
    pub fn emit(
        &mut self,
        category: Category,
        ty: impl Into<String>,
        payload: serde_json::Value,
        options: EmitOptions,
    ) -> SrcpResult<()> {
        if self.state == FabricState::Sealed {
            return Err(SrcpError::Sealed);
        }

        let ty = ty.into();
        let id = self.adapters.nonce.generate();
        let timestamp = self.adapters.clock.now();
        let priority = options.priority.unwrap_or_default();
        let issuer_did: Option<Did> = self.identity.as_ref().map(|i| i.did().clone());

        let mut event = Event {
            id,
            category,
            ty,
            payload,
            timestamp,
            priority,
            issuer_did,
            signature: None,
            is_replay: false,
        };

        if let Some(identity) = &self.identity {
            event.signature = Some(identity.sign(&event.signable_value()));
        }

        tracing::info!(category = %event.category, ty = %event.ty, timestamp = event.timestamp, "event emitted");
        self.adapters
            .logger
            .log(&format!("emit: {} {} at t={}", event.category, event.ty, event.timestamp));

        self.log.push(event.clone());
        self.queue.push(event);
        self.metrics.emitted += 1;
        Ok(())
    }

    /// Drain the queue, dispatching every queued event to every matching
    /// subscription whose rate limit currently permits it, in
    /// subscription-registration order. A handler returning `Err` is
    /// logged and counted; dispatch continues to the next subscription.
    pub fn flush(&mut self) -> FlushReport {
        let mut report = FlushReport::default();
        tracing::info!(queued = self.queue.len(), "flush starting");

        while let Some(event) = self.queue.pop() {
            for sub in &mut self.subscriptions {
                if !sub.pattern.matches(event.category, &event.ty) {
                    continue;
                }
                if !sub.permits(event.timestamp) {
                    report.rate_limited += 1;
                    self.metrics.rate_limited += 1;
                    continue;
                }
                sub.last_invocation_tick = Some(event.timestamp);
                match (sub.handler)(&event) {
                    Ok(()) => {
                        report.dispatched += 1;
                        self.metrics.dispatched += 1;
                    }
                    Err(e) => {
                        report.handler_errors += 1;
                        self.metrics.handler_errors += 1;
                        self.adapters.logger.error(&format!(
                            "flush: handler for subscription {:?} failed: {e}",
                            sub.id
                        ));
                    }
                }
            }
        }

        report
    }

    /// Re-dispatch every logged event to current subscribers with
    /// `is_replay = true`. Does not touch the log, the queue, or the
    /// running metrics — replay is an observation, not a new emission.
    pub fn replay(&mut self) -> usize {
        let mut dispatched = 0usize;
        let events: Vec<Event> = self.log.iter().map(|e| e.replay_copy()).collect();
        for event in &events {
            for sub in &mut self.subscriptions {
                if !sub.pattern.matches(event.category, &event.ty) {
                    continue;
                }
                if (sub.handler)(event).is_ok() {
                    dispatched += 1;
                }
            }
        }
        dispatched
    }

    pub fn query(&self, filter: EventQuery) -> Vec<&Event> {
        self.log
            .iter()
            .filter(|e| filter.category.map_or(true, |c| c == e.category))
            .filter(|e| filter.ty.as_deref().map_or(true, |t| t == e.ty))
            .filter(|e| filter.start_time.map_or(true, |s| e.timestamp >= s))
            .filter(|e| filter.end_time.map_or(true, |end| e.timestamp <= end))
            .collect()
    }

    pub fn export(&self) -> FabricExport {
        FabricExport {
            version: "1.0.0".to_string(),
            events: self.log.clone(),
            metrics: self.metrics,
        }
    }

    /// Replace the event log and metrics with an imported snapshot.
    /// Subscriptions are left untouched.
    pub fn import(&mut self, blob: FabricExport) {
        self.log = blob.events;
        self.metrics = blob.metrics;
    }

    pub fn seal(&mut self) {
        self.state = FabricState::Sealed;
        tracing::info!("fabric sealed");
        self.adapters.logger.log("seal: fabric sealed, no further emits accepted");
    }

    pub fn is_sealed(&self) -> bool {
        self.state == FabricState::Sealed
    }

    pub fn metrics(&self) -> &FabricMetrics {
        &self.metrics
    }

    pub fn log(&self) -> &[Event] {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use srcp_adapters::{TestClock, TestNonce, VecLogger};
    use std::sync::{Arc, Mutex};

    fn fabric(identity: Option<Identity>) -> EventFabric {
        EventFabric::new(
            FabricAdapters {
                clock: Box::new(TestClock::new(1)),
                nonce: Box::new(TestNonce::new(0)),
                logger: Box::new(VecLogger::new()),
            },
            identity,
        )
    }

    #[test]
    fn priority_dispatch_follows_priority_not_emission_order() {
        let mut fab = fabric(None);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = seen.clone();
        fab.subscribe(
            Pattern::Global,
            SubscriptionOptions::default(),
            Box::new(move |e| {
                seen_clone.lock().unwrap().push(e.priority);
                Ok(())
            }),
        );

        for p in [Priority::Low, Priority::Critical, Priority::Normal, Priority::High] {
            fab.emit(Category::App, "t", serde_json::json!({}), EmitOptions { priority: Some(p) })
                .unwrap();
        }
        fab.flush();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Priority::Critical, Priority::High, Priority::Normal, Priority::Low]
        );
    }

    #[test]
    fn rate_limited_handler_fires_on_the_expected_schedule() {
        let mut fab = EventFabric::new(
            FabricAdapters {
                clock: Box::new(srcp_adapters::FixedClock::new((1..=10).collect())),
                nonce: Box::new(TestNonce::new(0)),
                logger: Box::new(VecLogger::new()),
            },
            None,
        );
        let count = Arc::new(Mutex::new(0u32));
        let count_clone = count.clone();
        fab.subscribe(
            Pattern::Global,
            SubscriptionOptions { rate_limit_ticks: Some(5) },
            Box::new(move |_| {
                *count_clone.lock().unwrap() += 1;
                Ok(())
            }),
        );

        for _ in 0..10 {
            fab.emit(Category::App, "tick", serde_json::json!({}), EmitOptions::default())
                .unwrap();
            fab.flush();
        }

        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn sealed_fabric_rejects_new_emissions() {
        let mut fab = fabric(None);
        fab.seal();
        let err = fab
            .emit(Category::App, "t", serde_json::json!({}), EmitOptions::default())
            .unwrap_err();
        assert!(matches!(err, SrcpError::Sealed));
    }

    #[test]
    fn handler_errors_are_counted_and_do_not_halt_dispatch() {
        let mut fab = fabric(None);
        fab.subscribe(
            Pattern::Global,
            SubscriptionOptions::default(),
            Box::new(|_| Err(SrcpError::Other("boom".into()))),
        );
        let seen = Arc::new(Mutex::new(0));
        let seen_clone = seen.clone();
        fab.subscribe(
            Pattern::Global,
            SubscriptionOptions::default(),
            Box::new(move |_| {
                *seen_clone.lock().unwrap() += 1;
                Ok(())
            }),
        );

        fab.emit(Category::App, "t", serde_json::json!({}), EmitOptions::default()).unwrap();
        let report = fab.flush();

        assert_eq!(report.handler_errors, 1);
        assert_eq!(report.dispatched, 1);
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn replay_marks_events_as_replay_without_growing_the_log() {
        let mut fab = fabric(None);
        fab.emit(Category::App, "t", serde_json::json!({}), EmitOptions::default()).unwrap();
        fab.flush();

        let seen_replay = Arc::new(Mutex::new(false));
        let seen_replay_clone = seen_replay.clone();
        fab.subscribe(
            Pattern::Global,
            SubscriptionOptions::default(),
            Box::new(move |e| {
                *seen_replay_clone.lock().unwrap() = e.is_replay;
                Ok(())
            }),
        );

        let log_len_before = fab.log().len();
        let dispatched = fab.replay();
        assert_eq!(dispatched, 1);
        assert!(*seen_replay.lock().unwrap());
        assert_eq!(fab.log().len(), log_len_before);
    }

    #[test]
    fn query_filters_by_category_and_inclusive_time_range() {
        let mut fab = fabric(None);
        fab.emit(Category::App, "a", serde_json::json!({}), EmitOptions::default()).unwrap();
        fab.emit(Category::Ledger, "b", serde_json::json!({}), EmitOptions::default()).unwrap();
        fab.emit(Category::App, "c", serde_json::json!({}), EmitOptions::default()).unwrap();

        let app_events = fab.query(EventQuery { category: Some(Category::App), ..Default::default() });
        assert_eq!(app_events.len(), 2);

        let all = fab.query(EventQuery::default());
        let bounded = fab.query(EventQuery {
            start_time: Some(all[0].timestamp),
            end_time: Some(all[1].timestamp),
            ..Default::default()
        });
        assert_eq!(bounded.len(), 2);
    }

    #[test]
    fn export_then_import_round_trips_the_log_and_metrics() {
        let mut fab = fabric(None);
        fab.emit(Category::App, "a", serde_json::json!({"x": 1}), EmitOptions::default()).unwrap();
        fab.flush();
        let blob = fab.export();

        let mut other = fabric(None);
        other.import(blob.clone());
        assert_eq!(other.log().len(), 1);
        assert_eq!(other.metrics().emitted, blob.metrics.emitted);
    }
}
