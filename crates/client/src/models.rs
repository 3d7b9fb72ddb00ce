//! Wire types for the Orbitcart backend API.
//!
//! These mirror the backend's JSON shapes; the backend stays authoritative
//! for every derived value (subtotals, totals, rankings). Client-owned state
//! is limited to [`LocalCartItem`], the cart representation held on-device
//! for anonymous sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orbitcart_core::{CartId, CategoryId, Email, EventKind, Price, ProductId, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Auth & account
// ─────────────────────────────────────────────────────────────────────────────

/// A storefront user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response from `/auth/login` and `/auth/signup`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub session_id: String,
    pub user: User,
}

/// Partial account update for `PUT /account`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Carts
// ─────────────────────────────────────────────────────────────────────────────

/// A cart line as held on-device.
///
/// Product ids are strings here (the device store is schemaless); entries
/// whose id does not parse as an integer are dropped when pushing to the
/// server. Quantity is always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCartItem {
    pub product_id: String,
    pub quantity: u32,
}

impl LocalCartItem {
    /// Convenience constructor.
    #[must_use]
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A cart line as the server reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCartItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub subtotal: Price,
}

/// The server-held cart. Fetched, never locally recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCart {
    pub id: CartId,
    pub items: Vec<ServerCartItem>,
    pub total: Price,
}

/// A cart line in the shape cart create/replace requests expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// A tracked storefront event, as posted to `/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedEvent {
    pub event_type: EventKind,
    pub product_id: ProductId,
    pub user_session: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Discovery
// ─────────────────────────────────────────────────────────────────────────────

/// A product's position in the orbit embedding, as computed backend-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitPoint {
    pub product_id: ProductId,
    pub x: f64,
    pub y: f64,
}

/// The orbit view around a product: its embedding neighborhood.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitView {
    pub center: ProductId,
    pub points: Vec<OrbitPoint>,
}
