use srcp_adapters::{FixedClock, TestNonce, VecLogger};
use srcp_crypto::Identity;
use srcp_fabric::{
    Category, EmitOptions, EventFabric, EventQuery, FabricAdapters, Pattern, Priority,
    SubscriptionOptions,
};
use std::sync::{Arc, Mutex};

fn fixed_tick_fabric(ticks: Vec<i64>, identity: Option<Identity>) -> EventFabric {
    EventFabric::new(
        FabricAdapters {
            clock: Box::new(FixedClock::new(ticks)),
            nonce: Box::new(TestNonce::new(0)),
            logger: Box::new(VecLogger::new()),
        },
        identity,
    )
}

#[test]
fn subscribing_to_global_and_emitting_mixed_priorities_dispatches_highest_first() {
    let mut fabric = fixed_tick_fabric(vec![1000, 1000, 1000, 1000], None);
    let observed = Arc::new(Mutex::new(Vec::new()));
    let observed_clone = observed.clone();

    fabric.subscribe(
        Pattern::Global,
        SubscriptionOptions::default(),
        Box::new(move |e| {
            observed_clone.lock().unwrap().push(e.priority);
            Ok(())
        }),
    );

    for priority in [Priority::Low, Priority::Critical, Priority::Normal, Priority::High] {
        fabric
            .emit(
                Category::App,
                "mixed",
                serde_json::json!({}),
                EmitOptions { priority: Some(priority) },
            )
            .unwrap();
    }
    let report = fabric.flush();

    assert_eq!(report.dispatched, 4);
    assert_eq!(
        *observed.lock().unwrap(),
        vec![Priority::Critical, Priority::High, Priority::Normal, Priority::Low],
    );
}

#[test]
fn rate_limit_of_five_over_ten_one_per_tick_emissions_fires_twice() {
    let ticks: Vec<i64> = (1..=10).collect();
    let mut fabric = fixed_tick_fabric(ticks, None);
    let invocations = Arc::new(Mutex::new(0u32));
    let invocations_clone = invocations.clone();

    fabric.subscribe(
        Pattern::CategoryWildcard { category: Category::App },
        SubscriptionOptions { rate_limit_ticks: Some(5) },
        Box::new(move |_| {
            *invocations_clone.lock().unwrap() += 1;
            Ok(())
        }),
    );

    for _ in 0..10 {
        fabric
            .emit(Category::App, "tick", serde_json::json!({}), EmitOptions::default())
            .unwrap();
        fabric.flush();
    }

    assert_eq!(*invocations.lock().unwrap(), 2);
    assert_eq!(fabric.metrics().rate_limited, 8);
}

#[test]
fn replay_redispatches_the_log_as_replay_without_duplicating_entries() {
    let mut fabric = fixed_tick_fabric(vec![1, 2, 3], None);
    for ty in ["a", "b", "c"] {
        fabric
            .emit(Category::App, ty, serde_json::json!({"ty": ty}), EmitOptions::default())
            .unwrap();
    }
    fabric.flush();

    let replay_ids = Arc::new(Mutex::new(Vec::new()));
    let replay_ids_clone = replay_ids.clone();
    fabric.subscribe(
        Pattern::Global,
        SubscriptionOptions::default(),
        Box::new(move |e| {
            assert!(e.is_replay);
            replay_ids_clone.lock().unwrap().push(e.id.clone());
            Ok(())
        }),
    );

    let log_before = fabric.log().len();
    let dispatched = fabric.replay();

    assert_eq!(dispatched, 3);
    assert_eq!(replay_ids.lock().unwrap().len(), 3);
    assert_eq!(fabric.log().len(), log_before);
    assert!(fabric.log().iter().all(|e| !e.is_replay));
}

#[test]
fn signed_fabric_events_carry_verifiable_signatures() {
    let identity = Identity::create("publisher");
    let public_key = identity.public_key_jwk();
    let mut fabric = fixed_tick_fabric(vec![1], Some(identity));

    fabric
        .emit(Category::Security, "alert.raised", serde_json::json!({"level": "high"}), EmitOptions::default())
        .unwrap();

    let events = fabric.query(EventQuery::default());
    let event = events[0];
    let signature = event.signature.as_ref().expect("identity-backed fabric signs every event");
    assert!(Identity::verify(&public_key, &event.signable_value(), signature));
}

#[test]
fn export_and_import_preserve_the_log_while_leaving_subscriptions_untouched() {
    let mut source = fixed_tick_fabric(vec![1, 2], None);
    source
        .emit(Category::App, "a", serde_json::json!({}), EmitOptions::default())
        .unwrap();
    source
        .emit(Category::App, "b", serde_json::json!({}), EmitOptions::default())
        .unwrap();
    let blob = source.export();

    let mut destination = fixed_tick_fabric(vec![], None);
    let invocations = Arc::new(Mutex::new(0));
    let invocations_clone = invocations.clone();
    destination.subscribe(
        Pattern::Global,
        SubscriptionOptions::default(),
        Box::new(move |_| {
            *invocations_clone.lock().unwrap() += 1;
            Ok(())
        }),
    );

    destination.import(blob);
    assert_eq!(destination.log().len(), 2);
    assert_eq!(destination.metrics().emitted, 2);

    let replayed = destination.replay();
    assert_eq!(replayed, 2);
    assert_eq!(*invocations.lock().unwrap(), 2);
}
