//! Service modules grouping the API surface.
//!
//! - [`auth`] - login, signup, logout, account
//! - [`cart`] - server cart operations and login-time reconciliation
//! - [`catalog`] - cached product and category reads
//! - [`discovery`] - search, recommendations, orbit view
//! - [`events`] - best-effort event tracking

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod discovery;
pub mod events;
