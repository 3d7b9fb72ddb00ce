//! Orbitcart Core - Shared types library.
//!
//! This crate provides common types used across all Orbitcart components:
//! - `client` - Typed SDK for the Orbitcart backend API
//! - `cli` - Command-line storefront client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and
//!   tracking event kinds

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
