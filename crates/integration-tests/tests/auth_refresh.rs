//! Integration tests for bearer auth and single-flight token refresh.
//!
//! These exercise the full request path against the mock backend: 401
//! detection, the refresh-and-retry-once contract, refresh coordination
//! between concurrent callers, and session teardown on refresh failure.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use orbitcart_client::ApiError;
use orbitcart_client::session::{SessionStore, TokenSet};
use orbitcart_core::UserId;
use orbitcart_integration_tests::MockBackend;

// =============================================================================
// Login / Logout
// =============================================================================

#[tokio::test]
async fn test_login_stores_token_set_and_user_id() {
    let backend = MockBackend::spawn().await;
    let (client, session) = backend.client();

    let email = "user@example.com".parse().unwrap();
    let user = client.login(&email, "hunter2").await.unwrap();

    assert_eq!(user.id, UserId::new(7));
    let tokens = session.load().unwrap();
    assert_eq!(tokens.access_token, backend.valid_access_token());
    assert_eq!(tokens.session_id, "sess-login");
    assert_eq!(session.user_id(), Some(UserId::new(7)));

    // Immediately usable for authenticated requests.
    client.current_user().await.unwrap();
    assert_eq!(backend.refresh_calls(), 0);
}

#[tokio::test]
async fn test_login_bad_credentials_leaves_session_anonymous() {
    let backend = MockBackend::spawn().await;
    let (client, session) = backend.client();

    let email = "user@example.com".parse().unwrap();
    let result = client.login(&email, "wrong").await;

    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    assert!(session.load().is_none());
}

#[tokio::test]
async fn test_logout_clears_session_even_if_server_call_fails() {
    let backend = MockBackend::spawn().await;
    let (client, session) = backend.client();
    session.store(TokenSet::new(
        backend.valid_access_token(),
        backend.valid_refresh_token(),
        "sess-1",
    ));
    session.set_user_id(Some(UserId::new(7)));

    // The mock has no /auth/logout route; revocation 404s and is ignored.
    client.logout().await;

    assert!(session.load().is_none());
    assert!(session.user_id().is_none());
}

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn test_valid_token_needs_no_refresh() {
    let backend = MockBackend::spawn().await;
    let (client, session) = backend.client();
    session.store(TokenSet::new(
        backend.valid_access_token(),
        backend.valid_refresh_token(),
        "sess-1",
    ));

    let user = client.current_user().await.unwrap();

    assert_eq!(user.id, UserId::new(7));
    assert_eq!(backend.refresh_calls(), 0);
    assert_eq!(backend.account_hits(), 1);
}

#[tokio::test]
async fn test_expired_token_refreshes_and_retries_once() {
    let backend = MockBackend::spawn().await;
    let (client, session) = backend.client();
    session.store(TokenSet::new(
        "stale-access",
        backend.valid_refresh_token(),
        "sess-1",
    ));

    let user = client.current_user().await.unwrap();

    assert_eq!(user.id, UserId::new(7));
    assert_eq!(backend.refresh_calls(), 1);
    // Original request plus exactly one retry.
    assert_eq!(backend.account_hits(), 2);

    // The retry carried the rotated token, now stored in the session.
    let tokens = session.load().unwrap();
    assert_eq!(tokens.access_token, backend.valid_access_token());
    assert_eq!(tokens.session_id, "sess-1");
}

#[tokio::test]
async fn test_unrotated_refresh_token_is_kept() {
    let backend = MockBackend::spawn().await;
    let (client, session) = backend.client();
    let refresh = backend.valid_refresh_token();
    session.store(TokenSet::new("stale-access", refresh.clone(), "sess-1"));

    client.current_user().await.unwrap();

    // The backend rotates only the access token; the refresh token survives.
    let tokens = session.load().unwrap();
    assert_eq!(tokens.refresh_token(), refresh);
}

// =============================================================================
// Single-Flight Coordination
// =============================================================================

#[tokio::test]
async fn test_concurrent_401s_trigger_exactly_one_refresh() {
    let backend = MockBackend::spawn().await;
    backend.delay_refreshes(Duration::from_millis(150));

    let (client, session) = backend.client();
    session.store(TokenSet::new(
        "stale-access",
        backend.valid_refresh_token(),
        "sess-1",
    ));

    let (first, second) = tokio::join!(client.current_user(), client.current_user());

    assert!(first.is_ok());
    assert!(second.is_ok());
    // Both callers 401ed, but only the first one hit the refresh endpoint;
    // the second waited and reused the stored result.
    assert_eq!(backend.refresh_calls(), 1);
    // Two originals plus two retries.
    assert_eq!(backend.account_hits(), 4);
}

// =============================================================================
// Refresh Failure
// =============================================================================

#[tokio::test]
async fn test_refresh_failure_clears_session() {
    let backend = MockBackend::spawn().await;
    backend.fail_refreshes();

    let (client, session) = backend.client();
    session.store(TokenSet::new(
        "stale-access",
        backend.valid_refresh_token(),
        "sess-1",
    ));
    session.set_user_id(Some(UserId::new(7)));

    let result = client.current_user().await;

    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    // Forced logout: every piece of session state is gone.
    assert!(session.load().is_none());
    assert!(session.user_id().is_none());
    // The failed request was not retried.
    assert_eq!(backend.account_hits(), 1);
}

#[tokio::test]
async fn test_refresh_failure_rejects_queued_callers_without_retry() {
    let backend = MockBackend::spawn().await;
    backend.fail_refreshes();
    backend.delay_refreshes(Duration::from_millis(150));

    let (client, session) = backend.client();
    session.store(TokenSet::new(
        "stale-access",
        backend.valid_refresh_token(),
        "sess-1",
    ));

    let (first, second) = tokio::join!(client.current_user(), client.current_user());

    assert!(matches!(first, Err(ApiError::Unauthorized(_))));
    assert!(matches!(second, Err(ApiError::Unauthorized(_))));
    // One refresh attempt shared between both callers, no retries of the
    // original requests.
    assert_eq!(backend.refresh_calls(), 1);
    assert_eq!(backend.account_hits(), 2);
    assert!(session.load().is_none());
}

// =============================================================================
// Account
// =============================================================================

#[tokio::test]
async fn test_update_account_changes_name() {
    let backend = MockBackend::spawn().await;
    let (client, session) = backend.client();
    session.store(TokenSet::new(
        backend.valid_access_token(),
        backend.valid_refresh_token(),
        "sess-1",
    ));

    let update = orbitcart_client::models::AccountUpdate {
        name: Some("Renamed".to_string()),
        ..Default::default()
    };
    let user = client.update_account(&update).await.unwrap();

    assert_eq!(user.name.as_deref(), Some("Renamed"));
    assert_eq!(backend.account_name(), "Renamed");
}

// =============================================================================
// Anonymous Requests
// =============================================================================

#[tokio::test]
async fn test_anonymous_401_is_not_refreshed_or_retried() {
    let backend = MockBackend::spawn().await;
    let (client, _session) = backend.client();

    let result = client.current_user().await;

    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    assert_eq!(backend.refresh_calls(), 0);
    assert_eq!(backend.account_hits(), 1);
}
