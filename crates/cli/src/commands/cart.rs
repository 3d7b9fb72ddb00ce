//! Local cart management and server synchronization.

use orbitcart_client::models::LocalCartItem;
use orbitcart_client::{ApiClient, ApiError, EventTracker};
use orbitcart_core::{EventKind, ProductId};

use crate::store::LocalCartFile;
use crate::CliError;

/// Show the local cart, and the server cart when logged in.
pub async fn show(client: &ApiClient, cart_file: &LocalCartFile) -> Result<(), CliError> {
    let local = cart_file.load();
    if local.is_empty() {
        println!("Local cart is empty");
    } else {
        println!("Local cart:");
        for item in &local {
            println!("{:>6}  x{}", item.product_id, item.quantity);
        }
    }

    match client.fetch_cart().await {
        Ok(Some(cart)) => {
            println!("Server cart (cart {}):", cart.id);
            for item in &cart.items {
                println!("{:>6}  x{}  {}", item.product_id, item.quantity, item.subtotal);
            }
            println!("Total: {}", cart.total);
        }
        Ok(None) => println!("No server cart"),
        Err(ApiError::Unauthorized(_)) => println!("Not logged in; no server cart"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// Add a product to the local cart and track a cart event.
pub async fn add(
    cart_file: &LocalCartFile,
    tracker: &EventTracker,
    product_id: ProductId,
    quantity: u32,
) -> Result<(), CliError> {
    if quantity == 0 {
        return Err(CliError::InvalidArgument(
            "quantity must be at least 1".to_string(),
        ));
    }

    let mut items = cart_file.load();
    let key = product_id.to_string();
    match items.iter_mut().find(|item| item.product_id == key) {
        Some(item) => item.quantity += quantity,
        None => items.push(LocalCartItem::new(key, quantity)),
    }
    cart_file.save(&items)?;

    tracker.dispatch(EventKind::Cart, product_id).await;

    println!("Added product {product_id} x{quantity}");
    Ok(())
}

/// Remove a product from the local cart.
pub fn remove(cart_file: &LocalCartFile, product_id: ProductId) -> Result<(), CliError> {
    let mut items = cart_file.load();
    let key = product_id.to_string();
    let before = items.len();
    items.retain(|item| item.product_id != key);

    if items.len() == before {
        println!("Product {product_id} was not in the cart");
        return Ok(());
    }

    cart_file.save(&items)?;
    println!("Removed product {product_id}");
    Ok(())
}

/// Push the local cart to the server, then pull the merged result.
pub async fn sync(client: &ApiClient, cart_file: &LocalCartFile) -> Result<(), CliError> {
    let merged = client.sync_cart_on_login(&cart_file.load()).await?;
    cart_file.save(&merged)?;

    println!("Cart synced: {} item(s)", merged.len());
    Ok(())
}
