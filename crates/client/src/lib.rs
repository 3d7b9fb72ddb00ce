//! Orbitcart Client - Typed SDK for the Orbitcart storefront API.
//!
//! The backend service owns all storefront logic (catalog, carts, accounts,
//! semantic search and recommendation ranking); this crate is the client
//! side: request plumbing, bearer-token auth with transparent refresh, cart
//! reconciliation around login, and best-effort event tracking.
//!
//! # Architecture
//!
//! - [`ApiClient`] wraps `reqwest` and attaches `Authorization: Bearer …`
//!   from a [`SessionStore`]. A 401 triggers a single-flight token refresh;
//!   concurrent callers that hit 401 while a refresh is in flight wait for
//!   it and reuse its outcome instead of issuing their own.
//! - Service modules group the API surface: [`services::auth`],
//!   [`services::cart`] (including login-time reconciliation),
//!   [`services::catalog`] (moka-cached reads), [`services::discovery`],
//!   and [`services::events`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orbitcart_client::{ApiClient, ClientConfig, MemorySession};
//!
//! let config = ClientConfig::from_env()?;
//! let session = Arc::new(MemorySession::new());
//! let client = ApiClient::new(config, session)?;
//!
//! let user = client.login(&"user@example.com".parse()?, "hunter2!").await?;
//! let merged = client.sync_cart_on_login(&local_cart).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod services;
pub mod session;

pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use http::ApiClient;
pub use services::catalog::CatalogClient;
pub use services::events::EventTracker;
pub use session::{MemorySession, SessionStore, TokenSet};
