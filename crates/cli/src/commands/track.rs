//! Manual event dispatch.

use orbitcart_client::EventTracker;
use orbitcart_core::{EventKind, ProductId};

use crate::CliError;

/// Parse the event kind and dispatch a single event.
pub async fn send(
    tracker: &EventTracker,
    kind: &str,
    product_id: ProductId,
) -> Result<(), CliError> {
    let kind = match kind {
        "view" => EventKind::View,
        "cart" => EventKind::Cart,
        "purchase" => EventKind::Purchase,
        other => {
            return Err(CliError::InvalidArgument(format!(
                "unknown event kind '{other}' (expected view, cart, or purchase)"
            )));
        }
    };

    tracker.dispatch(kind, product_id).await;
    println!("Tracked {kind} event for product {product_id}");
    Ok(())
}
