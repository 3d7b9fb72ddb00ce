//! Integration tests for best-effort event tracking.

#![allow(clippy::unwrap_used)]

use orbitcart_client::EventTracker;
use orbitcart_client::session::{SessionStore, TokenSet};
use orbitcart_core::{EventKind, ProductId, UserId};
use orbitcart_integration_tests::MockBackend;

#[tokio::test]
async fn test_event_carries_kind_product_and_session() {
    let backend = MockBackend::spawn().await;
    let (client, _session) = backend.client();
    let tracker = EventTracker::new(client);

    tracker.dispatch(EventKind::View, ProductId::new(3)).await;

    let events = backend.events();
    assert_eq!(events.len(), 1);
    let body = &events[0].body;
    assert_eq!(body["event_type"], "view");
    assert_eq!(body["product_id"], 3);
    assert_eq!(body["user_session"], tracker.user_session());
}

#[tokio::test]
async fn test_anonymous_event_has_no_user_id_or_auth() {
    let backend = MockBackend::spawn().await;
    let (client, _session) = backend.client();
    let tracker = EventTracker::new(client);

    tracker.dispatch(EventKind::Cart, ProductId::new(8)).await;

    let events = backend.events();
    assert!(events[0].body.get("user_id").is_none());
    assert!(events[0].auth_header.is_none());
}

#[tokio::test]
async fn test_logged_in_event_carries_user_id_and_bearer() {
    let backend = MockBackend::spawn().await;
    let (client, session) = backend.client();
    session.store(TokenSet::new(
        backend.valid_access_token(),
        backend.valid_refresh_token(),
        "sess-1",
    ));
    session.set_user_id(Some(UserId::new(12)));
    let tracker = EventTracker::new(client);

    tracker
        .dispatch(EventKind::Purchase, ProductId::new(8))
        .await;

    let events = backend.events();
    assert_eq!(events[0].body["user_id"], 12);
    assert!(events[0].auth_header.as_deref().is_some_and(|h| h.starts_with("Bearer ")));
}

#[tokio::test]
async fn test_trackers_share_persisted_session_id() {
    let backend = MockBackend::spawn().await;
    let (client, session) = backend.client();
    session.store(TokenSet::new(
        backend.valid_access_token(),
        backend.valid_refresh_token(),
        "sess-1",
    ));

    // Separate trackers over one logged-in session, as consecutive CLI
    // invocations would build.
    let first = EventTracker::new(client.clone());
    let second = EventTracker::new(client);
    first.dispatch(EventKind::View, ProductId::new(1)).await;
    second.dispatch(EventKind::Cart, ProductId::new(2)).await;

    let events = backend.events();
    assert_eq!(events[0].body["user_session"], "sess-1");
    assert_eq!(events[0].body["user_session"], events[1].body["user_session"]);
}

#[tokio::test]
async fn test_track_many_delivers_in_background() {
    let backend = MockBackend::spawn().await;
    let (client, _session) = backend.client();
    let tracker = EventTracker::new(client);

    tracker.track_many(&[
        (EventKind::View, ProductId::new(1)),
        (EventKind::Cart, ProductId::new(2)),
    ]);

    for _ in 0..100 {
        if !backend.events().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let events = backend.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].body["events"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_failed_event_is_swallowed_and_not_retried() {
    let backend = MockBackend::spawn().await;
    backend.fail_events();
    let (client, _session) = backend.client();
    let tracker = EventTracker::new(client);

    // Best-effort contract: the failure surfaces nowhere.
    tracker.dispatch(EventKind::View, ProductId::new(3)).await;

    assert_eq!(backend.event_requests(), 1);
    assert!(backend.events().is_empty());
}

#[tokio::test]
async fn test_empty_batch_makes_no_request() {
    let backend = MockBackend::spawn().await;
    let (client, _session) = backend.client();
    let tracker = EventTracker::new(client);

    tracker.dispatch_many(&[]).await;

    assert_eq!(backend.event_requests(), 0);
}

#[tokio::test]
async fn test_batch_dispatch_sends_one_request() {
    let backend = MockBackend::spawn().await;
    let (client, _session) = backend.client();
    let tracker = EventTracker::new(client);

    tracker
        .dispatch_many(&[
            (EventKind::View, ProductId::new(1)),
            (EventKind::Cart, ProductId::new(2)),
        ])
        .await;

    assert_eq!(backend.event_requests(), 1);
    let events = backend.events();
    let batch = events[0].body["events"].as_array().unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0]["event_type"], "view");
    assert_eq!(batch[1]["event_type"], "cart");
}
