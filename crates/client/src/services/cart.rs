//! Server cart operations and login-time reconciliation.
//!
//! Two cart representations exist: the on-device local cart (authoritative
//! while anonymous) and the server cart (authoritative once logged in).
//! Around login the two are reconciled with a fold: push the local cart up
//! first so anonymous additions survive, then pull the server cart down,
//! keeping the larger quantity wherever both sides hold the same product.

use serde::Serialize;
use tracing::{debug, warn};

use orbitcart_core::{CartId, ProductId};

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{LocalCartItem, NewCartItem, ServerCart};

#[derive(Serialize)]
struct CartItemsBody<'a> {
    items: &'a [NewCartItem],
}

/// Merge a server cart into a local cart.
///
/// For each server item with a matching local entry, the merged quantity is
/// the maximum of the two; server items with no local counterpart are
/// appended. Local items the server does not know about are untouched, and
/// server lines with a non-positive quantity are skipped.
#[must_use]
pub fn merge_server_into_local(local: &[LocalCartItem], server: &ServerCart) -> Vec<LocalCartItem> {
    let mut merged = local.to_vec();

    for item in &server.items {
        let server_quantity = u32::try_from(item.quantity).unwrap_or(0);
        if server_quantity == 0 {
            continue;
        }

        let key = item.product_id.to_string();
        match merged.iter_mut().find(|entry| entry.product_id == key) {
            Some(entry) => entry.quantity = entry.quantity.max(server_quantity),
            None => merged.push(LocalCartItem::new(key, server_quantity)),
        }
    }

    merged
}

/// Convert local cart entries to the server's item shape.
///
/// Entries whose product id does not parse as an integer are dropped; the
/// device store is schemaless and has been observed to hold junk keys.
#[must_use]
pub fn to_server_items(local: &[LocalCartItem]) -> Vec<NewCartItem> {
    local
        .iter()
        .filter_map(|entry| {
            let Ok(product_id) = entry.product_id.parse::<ProductId>() else {
                warn!(product_id = %entry.product_id, "dropping cart entry with non-numeric product id");
                return None;
            };
            Some(NewCartItem {
                product_id,
                quantity: i32::try_from(entry.quantity).unwrap_or(i32::MAX),
            })
        })
        .collect()
}

impl ApiClient {
    /// Fetch the authenticated user's server cart.
    ///
    /// Returns `None` when the user has no cart yet.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than a missing cart.
    pub async fn fetch_cart(&self) -> Result<Option<ServerCart>, ApiError> {
        match self.get_json::<ServerCart>("carts/me").await {
            Ok(cart) => Ok(Some(cart)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Create a new server cart with the given items.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_cart(&self, items: &[NewCartItem]) -> Result<ServerCart, ApiError> {
        self.post_json("carts", &CartItemsBody { items }).await
    }

    /// Overwrite a server cart's items with the given set.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn replace_items(
        &self,
        cart_id: CartId,
        items: &[NewCartItem],
    ) -> Result<ServerCart, ApiError> {
        self.put_json(&format!("carts/{cart_id}/items"), &CartItemsBody { items })
            .await
    }

    /// Delete a server cart (checkout-clear).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn clear_cart(&self, cart_id: CartId) -> Result<(), ApiError> {
        self.delete_no_content(&format!("carts/{cart_id}")).await
    }

    /// Push the local cart to the server (local → server direction).
    ///
    /// Overwrites the items of an existing server cart, or creates a new
    /// cart when none exists. Issues no network call at all when the local
    /// cart is empty, or when every entry is dropped for a non-numeric id.
    ///
    /// # Errors
    ///
    /// Returns an error if a cart request fails.
    pub async fn push_local_cart(&self, local: &[LocalCartItem]) -> Result<(), ApiError> {
        if local.is_empty() {
            debug!("local cart empty, nothing to push");
            return Ok(());
        }

        let items = to_server_items(local);
        if items.is_empty() {
            warn!("no pushable entries in local cart, leaving server cart untouched");
            return Ok(());
        }

        match self.fetch_cart().await? {
            Some(cart) => {
                self.replace_items(cart.id, &items).await?;
            }
            None => {
                self.create_cart(&items).await?;
            }
        }
        Ok(())
    }

    /// Pull the server cart into the local cart (server → local direction).
    ///
    /// Returns the merged local cart for the caller to persist. An absent or
    /// empty server cart leaves the local cart untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching the server cart fails.
    pub async fn pull_server_cart(
        &self,
        local: &[LocalCartItem],
    ) -> Result<Vec<LocalCartItem>, ApiError> {
        match self.fetch_cart().await? {
            Some(cart) if !cart.items.is_empty() => Ok(merge_server_into_local(local, &cart)),
            _ => Ok(local.to_vec()),
        }
    }

    /// Reconcile carts at login: push, then pull.
    ///
    /// Push runs first so additions made while anonymous survive; the pull
    /// then folds in anything already on the server. This is a fold, not a
    /// true merge: if the server cart mutates concurrently between the two
    /// steps the result depends on timing, and running the sequence twice is
    /// not idempotent in general.
    ///
    /// # Errors
    ///
    /// Returns an error if either direction fails.
    pub async fn sync_cart_on_login(
        &self,
        local: &[LocalCartItem],
    ) -> Result<Vec<LocalCartItem>, ApiError> {
        self.push_local_cart(local).await?;
        self.pull_server_cart(local).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use orbitcart_core::Price;
    use crate::models::ServerCartItem;

    fn server_cart(items: Vec<(i32, i32)>) -> ServerCart {
        ServerCart {
            id: CartId::new(1),
            items: items
                .into_iter()
                .map(|(product_id, quantity)| ServerCartItem {
                    product_id: ProductId::new(product_id),
                    quantity,
                    subtotal: Price::ZERO,
                })
                .collect(),
            total: Price::ZERO,
        }
    }

    #[test]
    fn test_merge_keeps_max_quantity_per_product() {
        let local = vec![LocalCartItem::new("1", 2)];
        let server = server_cart(vec![(1, 5)]);

        let merged = merge_server_into_local(&local, &server);

        assert_eq!(merged, vec![LocalCartItem::new("1", 5)]);
    }

    #[test]
    fn test_merge_prefers_larger_local_quantity() {
        let local = vec![LocalCartItem::new("1", 7)];
        let server = server_cart(vec![(1, 3)]);

        let merged = merge_server_into_local(&local, &server);

        assert_eq!(merged, vec![LocalCartItem::new("1", 7)]);
    }

    #[test]
    fn test_merge_appends_server_only_items() {
        let local = vec![LocalCartItem::new("1", 2)];
        let server = server_cart(vec![(2, 4)]);

        let merged = merge_server_into_local(&local, &server);

        assert_eq!(
            merged,
            vec![LocalCartItem::new("1", 2), LocalCartItem::new("2", 4)]
        );
    }

    #[test]
    fn test_merge_with_empty_server_cart_is_identity() {
        let local = vec![LocalCartItem::new("1", 2), LocalCartItem::new("9", 1)];
        let server = server_cart(vec![]);

        assert_eq!(merge_server_into_local(&local, &server), local);
    }

    #[test]
    fn test_merge_skips_non_positive_server_quantities() {
        let local = vec![LocalCartItem::new("1", 2)];
        let server = server_cart(vec![(2, 0), (3, -1)]);

        assert_eq!(merge_server_into_local(&local, &server), local);
    }

    #[test]
    fn test_to_server_items_filters_non_numeric_ids() {
        let local = vec![
            LocalCartItem::new("1", 2),
            LocalCartItem::new("abc", 3),
            LocalCartItem::new("42", 1),
        ];

        let items = to_server_items(&local);

        assert_eq!(
            items,
            vec![
                NewCartItem {
                    product_id: ProductId::new(1),
                    quantity: 2,
                },
                NewCartItem {
                    product_id: ProductId::new(42),
                    quantity: 1,
                },
            ]
        );
    }

    #[test]
    fn test_to_server_items_empty_input() {
        assert!(to_server_items(&[]).is_empty());
    }
}
