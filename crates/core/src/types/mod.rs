//! Core types for Orbitcart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod event;
pub mod id;
pub mod price;

pub use email::{Email, EmailError};
pub use event::EventKind;
pub use id::*;
pub use price::{Price, PriceError};
