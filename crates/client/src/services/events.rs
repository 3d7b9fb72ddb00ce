//! Best-effort event tracking.
//!
//! View/cart/purchase events feed the backend's recommendation models.
//! Delivery is best-effort by contract: a failed event is logged and
//! dropped, never surfaced to the user and never retried.

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use orbitcart_core::{EventKind, ProductId};

use crate::http::ApiClient;
use crate::models::TrackedEvent;

#[derive(Serialize)]
struct EventBatch {
    events: Vec<TrackedEvent>,
}

/// Tracker for storefront events.
///
/// The `user_session` id correlates events across trackers: when the
/// session store holds a token set its server-assigned session id is
/// reused, so every tracker built over the same logged-in session emits
/// the same id. Anonymous trackers generate one that lives as long as the
/// tracker does. The logged-in user id, when the session store holds one,
/// is attached to every event.
#[derive(Clone)]
pub struct EventTracker {
    api: ApiClient,
    user_session: String,
}

impl EventTracker {
    /// Create a tracker, reusing the stored session id when logged in.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let user_session = api
            .session()
            .load()
            .map_or_else(|| Uuid::new_v4().to_string(), |tokens| tokens.session_id);
        Self { api, user_session }
    }

    /// The tracker's session id.
    #[must_use]
    pub fn user_session(&self) -> &str {
        &self.user_session
    }

    /// Send a single event and wait for the attempt to finish.
    ///
    /// Failures are logged at `warn` and swallowed.
    pub async fn dispatch(&self, kind: EventKind, product_id: ProductId) {
        let event = self.build_event(kind, product_id);
        if let Err(err) = self.api.post_no_content("events", &event).await {
            warn!(error = %err, event_type = %kind, %product_id, "event dispatch failed");
        }
    }

    /// Send a batch of events and wait for the attempt to finish.
    ///
    /// Failures are logged at `warn` and swallowed. An empty batch issues
    /// no network call.
    pub async fn dispatch_many(&self, events: &[(EventKind, ProductId)]) {
        if events.is_empty() {
            return;
        }

        let batch = EventBatch {
            events: events
                .iter()
                .map(|&(kind, product_id)| self.build_event(kind, product_id))
                .collect(),
        };

        if let Err(err) = self.api.post_no_content("events/batch", &batch).await {
            warn!(error = %err, count = events.len(), "event batch dispatch failed");
        }
    }

    /// Fire-and-forget variant of [`dispatch`](Self::dispatch).
    ///
    /// Spawns the send on the runtime; the caller continues immediately.
    pub fn track(&self, kind: EventKind, product_id: ProductId) {
        let tracker = self.clone();
        tokio::spawn(async move {
            tracker.dispatch(kind, product_id).await;
        });
    }

    /// Fire-and-forget variant of [`dispatch_many`](Self::dispatch_many).
    pub fn track_many(&self, events: &[(EventKind, ProductId)]) {
        if events.is_empty() {
            return;
        }
        let tracker = self.clone();
        let events = events.to_vec();
        tokio::spawn(async move {
            tracker.dispatch_many(&events).await;
        });
    }

    fn build_event(&self, kind: EventKind, product_id: ProductId) -> TrackedEvent {
        TrackedEvent {
            event_type: kind,
            product_id,
            user_session: self.user_session.clone(),
            user_id: self.api.session().user_id(),
        }
    }
}
