//! Integration tests for the coordination protocols.
//!
//! These tests drive the coordinator end-to-end with recording capability
//! doubles and assert the registration, subscription, and wiring guarantees.

mod support;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use telewire::{Coordinator, CoordinatorConfig, CoordinatorError, EventKind, Ident};

use support::{RecordingHandler, RecordingSource};

fn coordinator() -> Arc<Coordinator> {
    Coordinator::builder(CoordinatorConfig::default()).build()
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_source_creates_manager() {
    let coordinator = coordinator();
    let source = RecordingSource::new("dummysource", "memory");
    let ident = source.ident();

    coordinator.register_source(source.clone()).await.unwrap();

    let mgr = coordinator.source_manager(&ident).await.expect("manager exists");
    assert_eq!(mgr.ident(), &ident);
    assert_eq!(coordinator.sources().await, vec![ident.clone()]);

    coordinator.deregister_source(source.as_ref()).await;
    assert!(coordinator.source_manager(&ident).await.is_none());
    assert!(coordinator.sources().await.is_empty());
}

#[tokio::test]
async fn test_handler_receives_link_exactly_once() {
    let coordinator = coordinator();
    let handler = RecordingHandler::new("console", "memory");

    coordinator.register_handler(handler.clone()).await.unwrap();

    let links = handler.links.lock().unwrap();
    assert_eq!(links.len(), 1, "on_attached is called exactly once");
    assert_eq!(links[0].handler(), &handler.ident());
    assert!(links[0].is_attached());
}

#[tokio::test]
async fn test_duplicate_registrations_rejected() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("console", "memory");

    coordinator.register_source(source.clone()).await.unwrap();
    let err = coordinator
        .register_source(RecordingSource::new("trace", "memory"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::DuplicateSource { .. }));
    assert_eq!(err.as_label(), "duplicate_source");

    coordinator.register_handler(handler.clone()).await.unwrap();
    let err = coordinator
        .register_handler(RecordingHandler::new("console", "memory"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::DuplicateHandler { .. }));

    // The duplicate handler instance never got a link.
    assert_eq!(handler.links.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_deregister_unknown_is_noop() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("console", "memory");

    // Neither was registered; both calls are tolerated.
    coordinator.deregister_source(source.as_ref()).await;
    coordinator.deregister_handler(handler.as_ref()).await;

    assert!(coordinator.sources().await.is_empty());
    assert!(coordinator.handlers().await.is_empty());
}

// =============================================================================
// Subscription: late source (Scenario A)
// =============================================================================

#[tokio::test]
async fn test_late_source_resolution() {
    let coordinator = coordinator();
    let handler = RecordingHandler::new("console", "memory");
    let source_id = Ident::from_raw("src|mem");

    coordinator.register_handler(handler.clone()).await.unwrap();
    coordinator
        .subscribe(handler.as_ref(), &[source_id.clone()])
        .await
        .unwrap();

    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert_eq!(snap.pending, vec![source_id.clone()]);
    assert!(snap.subscribed.is_empty());
    assert_eq!(handler.installed_count(), 0, "nothing wired yet");

    let source = RecordingSource::new("src", "mem");
    coordinator.register_source(source.clone()).await.unwrap();

    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert_eq!(snap.subscribed, vec![source_id.clone()]);
    assert!(snap.pending.is_empty());

    assert_eq!(
        coordinator.source_subscriptions(&source_id).await.unwrap(),
        vec![handler.ident()]
    );

    let installed = handler.installed.lock().unwrap();
    assert_eq!(installed.len(), 1);
    assert_eq!(installed[0].0, source_id);
}

#[tokio::test]
async fn test_ordering_independent_outcome() {
    // Register-then-subscribe.
    let a = coordinator();
    let a_source = RecordingSource::new("trace", "memory");
    let a_handler = RecordingHandler::new("console", "memory");
    a.register_source(a_source.clone()).await.unwrap();
    a.register_handler(a_handler.clone()).await.unwrap();
    a.subscribe(a_handler.as_ref(), &[a_source.ident()]).await.unwrap();

    // Subscribe-then-register.
    let b = coordinator();
    let b_source = RecordingSource::new("trace", "memory");
    let b_handler = RecordingHandler::new("console", "memory");
    b.register_handler(b_handler.clone()).await.unwrap();
    b.subscribe(b_handler.as_ref(), &[b_source.ident()]).await.unwrap();
    b.register_source(b_source.clone()).await.unwrap();

    let snap_a = a.handler_subscriptions(&a_handler.ident()).await.unwrap();
    let snap_b = b.handler_subscriptions(&b_handler.ident()).await.unwrap();
    assert_eq!(snap_a, snap_b, "both orders produce the identical state");

    assert_eq!(
        a.source_subscriptions(&a_source.ident()).await.unwrap(),
        b.source_subscriptions(&b_source.ident()).await.unwrap()
    );

    assert_eq!(a_handler.installed_count(), 1);
    assert_eq!(b_handler.installed_count(), 1);
    assert_eq!(a_source.opened_count(), 1);
    assert_eq!(b_source.opened_count(), 1);
}

#[tokio::test]
async fn test_concurrent_register_and_subscribe_wire_once() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("console", "memory");
    coordinator.register_handler(handler.clone()).await.unwrap();

    let reg = coordinator.register_source(source.clone());
    let sub_idents = [source.ident()];
    let sub = coordinator.subscribe(handler.as_ref(), &sub_idents);
    let (reg, sub) = tokio::join!(reg, sub);
    reg.unwrap();
    sub.unwrap();

    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert_eq!(snap.subscribed, vec![source.ident()]);
    assert!(snap.pending.is_empty());
    assert_eq!(source.opened_count(), 1, "exactly one buffer created");
    assert_eq!(handler.installed_count(), 1, "exactly one buffer installed");
}

// =============================================================================
// Subscription: immediate wiring and teardown (Scenario B)
// =============================================================================

#[tokio::test]
async fn test_wire_unwire_rewire_cycle() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("console", "memory");

    coordinator.register_source(source.clone()).await.unwrap();
    coordinator.register_handler(handler.clone()).await.unwrap();

    coordinator
        .subscribe(handler.as_ref(), &[source.ident()])
        .await
        .unwrap();
    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert_eq!(snap.subscribed, vec![source.ident()]);
    assert!(snap.pending.is_empty(), "source was present: no pending step");
    assert!(handler.buffers.lock().unwrap().contains_key(&source.ident()));

    coordinator
        .unsubscribe(handler.as_ref(), &[source.ident()])
        .await
        .unwrap();
    assert_eq!(handler.removed_count(), 1, "handler released exactly once");
    assert_eq!(source.closed_count(), 1, "source released exactly once");
    assert!(handler.buffers.lock().unwrap().is_empty());
    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert!(snap.subscribed.is_empty());
    assert!(coordinator
        .source_subscriptions(&source.ident())
        .await
        .unwrap()
        .is_empty());

    // Re-subscribe: a fresh buffer manager is created and installed.
    coordinator
        .subscribe(handler.as_ref(), &[source.ident()])
        .await
        .unwrap();
    let installed = handler.installed.lock().unwrap();
    assert_eq!(installed.len(), 2);
    assert!(
        !Arc::ptr_eq(&installed[0].1, &installed[1].1),
        "re-wiring installs a fresh handle"
    );
}

#[tokio::test]
async fn test_subscribe_is_idempotent() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("console", "memory");

    coordinator.register_source(source.clone()).await.unwrap();
    coordinator.register_handler(handler.clone()).await.unwrap();

    coordinator.subscribe(handler.as_ref(), &[source.ident()]).await.unwrap();
    coordinator.subscribe(handler.as_ref(), &[source.ident()]).await.unwrap();

    assert_eq!(source.opened_count(), 1, "no duplicate buffer");
    assert_eq!(handler.installed_count(), 1, "no double install");

    // Pending requests are idempotent too.
    let absent = Ident::from_raw("gc|mem");
    coordinator.subscribe(handler.as_ref(), &[absent.clone()]).await.unwrap();
    coordinator.subscribe(handler.as_ref(), &[absent.clone()]).await.unwrap();
    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert_eq!(snap.pending, vec![absent]);
}

#[tokio::test]
async fn test_unregistered_handler_is_hard_failure() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("ghost", "memory");
    coordinator.register_source(source.clone()).await.unwrap();

    let err = coordinator
        .subscribe(handler.as_ref(), &[source.ident()])
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::NotRegistered { .. }));
    assert_eq!(err.as_label(), "handler_not_registered");

    let err = coordinator
        .unsubscribe(handler.as_ref(), &[source.ident()])
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::NotRegistered { .. }));

    // No state was mutated.
    assert!(coordinator
        .source_subscriptions(&source.ident())
        .await
        .unwrap()
        .is_empty());
    assert!(coordinator.handlers().await.is_empty());
    assert_eq!(source.opened_count(), 0);
}

#[tokio::test]
async fn test_unsubscribe_pending_and_unknown() {
    let coordinator = coordinator();
    let handler = RecordingHandler::new("console", "memory");
    coordinator.register_handler(handler.clone()).await.unwrap();

    let pending = Ident::from_raw("src|mem");
    coordinator.subscribe(handler.as_ref(), &[pending.clone()]).await.unwrap();

    // Pending entry is dropped; unknown idents are ignored.
    coordinator
        .unsubscribe(
            handler.as_ref(),
            &[pending.clone(), Ident::from_raw("never|seen")],
        )
        .await
        .unwrap();

    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert!(snap.pending.is_empty());
    assert!(snap.subscribed.is_empty());

    // The dropped entry does not resolve when the source appears.
    coordinator
        .register_source(RecordingSource::new("src", "mem"))
        .await
        .unwrap();
    assert_eq!(handler.installed_count(), 0);
}

// =============================================================================
// Link-driven subscriptions
// =============================================================================

#[tokio::test]
async fn test_handler_drives_subscriptions_through_link() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("console", "memory");

    coordinator.register_source(source.clone()).await.unwrap();
    coordinator.register_handler(handler.clone()).await.unwrap();

    let link = handler.link();
    link.subscribe(&[source.ident()]).await.unwrap();
    assert_eq!(handler.installed_count(), 1);

    link.unsubscribe(&[source.ident()]).await.unwrap();
    assert_eq!(handler.removed_count(), 1);

    // After deregistration the link reports the handler as unknown.
    coordinator.deregister_handler(handler.as_ref()).await;
    let err = link.subscribe(&[source.ident()]).await.unwrap_err();
    assert!(matches!(err, CoordinatorError::NotRegistered { .. }));
}

// =============================================================================
// Deregistration draining
// =============================================================================

#[tokio::test]
async fn test_deregister_source_unwires_and_drops() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("console", "memory");

    coordinator.register_source(source.clone()).await.unwrap();
    coordinator.register_handler(handler.clone()).await.unwrap();
    coordinator.subscribe(handler.as_ref(), &[source.ident()]).await.unwrap();

    coordinator.deregister_source(source.as_ref()).await;

    assert_eq!(handler.removed_count(), 1);
    assert_eq!(source.closed_count(), 1);
    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert!(snap.subscribed.is_empty());
    assert!(
        snap.pending.is_empty(),
        "dropped subscriptions are not re-queued to pending"
    );

    // Policy: a re-registered source wires nothing until re-subscribed.
    let reborn = RecordingSource::new("trace", "memory");
    coordinator.register_source(reborn.clone()).await.unwrap();
    assert_eq!(reborn.opened_count(), 0);
    assert!(coordinator
        .source_subscriptions(&reborn.ident())
        .await
        .unwrap()
        .is_empty());

    // An explicit re-subscribe wires again.
    coordinator.subscribe(handler.as_ref(), &[reborn.ident()]).await.unwrap();
    assert_eq!(reborn.opened_count(), 1);
}

#[tokio::test]
async fn test_deregister_handler_drains_active_and_pending() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("console", "memory");

    coordinator.register_source(source.clone()).await.unwrap();
    coordinator.register_handler(handler.clone()).await.unwrap();
    coordinator
        .subscribe(
            handler.as_ref(),
            &[source.ident(), Ident::from_raw("absent|mem")],
        )
        .await
        .unwrap();

    coordinator.deregister_handler(handler.as_ref()).await;

    assert!(coordinator.handlers().await.is_empty());
    assert_eq!(handler.removed_count(), 1);
    assert_eq!(source.closed_count(), 1);
    assert!(coordinator
        .source_subscriptions(&source.ident())
        .await
        .unwrap()
        .is_empty());

    // The discarded pending entry does not resolve later.
    coordinator
        .register_source(RecordingSource::new("absent", "mem"))
        .await
        .unwrap();
    assert_eq!(handler.installed_count(), 1, "only the original wiring");
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn test_install_failure_rolls_back_wiring() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("console", "memory");

    coordinator.register_source(source.clone()).await.unwrap();
    coordinator.register_handler(handler.clone()).await.unwrap();

    handler.fail_install.store(true, Ordering::SeqCst);
    let err = coordinator
        .subscribe(handler.as_ref(), &[source.ident()])
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::Wiring { .. }));
    assert_eq!(err.as_label(), "wiring_failed");

    // The buffer was created once and released again; nothing is recorded.
    assert_eq!(source.opened_count(), 1);
    assert_eq!(source.closed_count(), 1);
    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert!(snap.subscribed.is_empty());
    assert!(snap.pending.is_empty());
    assert!(coordinator
        .source_subscriptions(&source.ident())
        .await
        .unwrap()
        .is_empty());

    // The pair can be wired once the capability recovers.
    handler.fail_install.store(false, Ordering::SeqCst);
    coordinator.subscribe(handler.as_ref(), &[source.ident()]).await.unwrap();
    assert_eq!(handler.installed_count(), 1);
}

#[tokio::test]
async fn test_open_failure_leaves_pair_unsubscribed() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("console", "memory");

    coordinator.register_source(source.clone()).await.unwrap();
    coordinator.register_handler(handler.clone()).await.unwrap();

    source.fail_open.store(true, Ordering::SeqCst);
    let err = coordinator
        .subscribe(handler.as_ref(), &[source.ident()])
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::Wiring { .. }));

    assert_eq!(handler.installed_count(), 0);
    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert!(snap.subscribed.is_empty());
    assert!(snap.pending.is_empty());
}

#[tokio::test]
async fn test_pending_resolution_failure_keeps_pair_pending() {
    let coordinator = coordinator();
    let handler = RecordingHandler::new("console", "memory");
    coordinator.register_handler(handler.clone()).await.unwrap();
    coordinator
        .subscribe(handler.as_ref(), &[Ident::from_raw("trace|memory")])
        .await
        .unwrap();

    let source = RecordingSource::new("trace", "memory");
    source.fail_open.store(true, Ordering::SeqCst);
    let err = coordinator.register_source(source.clone()).await.unwrap_err();
    assert!(matches!(err, CoordinatorError::Wiring { .. }));

    // The source is registered; the failed pair stayed pending.
    assert!(coordinator.source_manager(&source.ident()).await.is_some());
    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert_eq!(snap.pending, vec![source.ident()]);
    assert!(snap.subscribed.is_empty());
}

#[tokio::test]
async fn test_release_failure_does_not_block_cleanup() {
    let coordinator = coordinator();
    let source = RecordingSource::new("trace", "memory");
    let handler = RecordingHandler::new("console", "memory");

    coordinator.register_source(source.clone()).await.unwrap();
    coordinator.register_handler(handler.clone()).await.unwrap();
    coordinator.subscribe(handler.as_ref(), &[source.ident()]).await.unwrap();

    let mut rx = coordinator.bus().subscribe();
    handler.fail_remove.store(true, Ordering::SeqCst);
    coordinator
        .unsubscribe(handler.as_ref(), &[source.ident()])
        .await
        .unwrap();

    // Bookkeeping was cleaned up despite the capability failure.
    let snap = coordinator
        .handler_subscriptions(&handler.ident())
        .await
        .unwrap();
    assert!(snap.subscribed.is_empty());
    assert!(coordinator
        .source_subscriptions(&source.ident())
        .await
        .unwrap()
        .is_empty());

    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    assert!(kinds.contains(&EventKind::ReleaseFailed));
    assert!(kinds.contains(&EventKind::SubscriptionUnwired));
}

// =============================================================================
// Events and teardown
// =============================================================================

#[tokio::test]
async fn test_lifecycle_events_in_order() {
    let coordinator = coordinator();
    let mut rx = coordinator.bus().subscribe();

    let handler = RecordingHandler::new("console", "memory");
    coordinator.register_handler(handler.clone()).await.unwrap();
    coordinator
        .subscribe(handler.as_ref(), &[Ident::from_raw("trace|memory")])
        .await
        .unwrap();
    coordinator
        .register_source(RecordingSource::new("trace", "memory"))
        .await
        .unwrap();

    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    assert_eq!(
        kinds,
        vec![
            EventKind::HandlerRegistered,
            EventKind::SubscriptionPending,
            EventKind::SourceRegistered,
            EventKind::SubscriptionWired,
        ]
    );
}

#[tokio::test]
async fn test_shutdown_drains_registry() {
    let coordinator = coordinator();
    let source_a = RecordingSource::new("trace", "memory");
    let source_b = RecordingSource::new("accesslog", "memory");
    let handler_a = RecordingHandler::new("console", "memory");
    let handler_b = RecordingHandler::new("exporter", "memory");

    coordinator.register_source(source_a.clone()).await.unwrap();
    coordinator.register_source(source_b.clone()).await.unwrap();
    coordinator.register_handler(handler_a.clone()).await.unwrap();
    coordinator.register_handler(handler_b.clone()).await.unwrap();
    coordinator
        .subscribe(handler_a.as_ref(), &[source_a.ident(), source_b.ident()])
        .await
        .unwrap();
    coordinator
        .subscribe(handler_b.as_ref(), &[source_a.ident()])
        .await
        .unwrap();

    let mut rx = coordinator.bus().subscribe();
    coordinator.shutdown().await;

    assert!(coordinator.sources().await.is_empty());
    assert!(coordinator.handlers().await.is_empty());

    // Every wiring was released on both sides exactly once.
    assert_eq!(handler_a.removed_count(), 2);
    assert_eq!(handler_b.removed_count(), 1);
    assert_eq!(source_a.closed_count(), 2);
    assert_eq!(source_b.closed_count(), 1);

    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    assert_eq!(kinds.last(), Some(&EventKind::CoordinatorClosed));
    assert_eq!(
        kinds.iter().filter(|k| **k == EventKind::SubscriptionUnwired).count(),
        3
    );
}
