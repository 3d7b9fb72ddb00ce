//! Tracking event kinds.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a tracked storefront event.
///
/// Serialized lowercase on the wire (`view`, `cart`, `purchase`), matching
/// the backend's events endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A product detail page was viewed.
    View,
    /// A product was added to the cart.
    Cart,
    /// A product was purchased.
    Purchase,
}

impl EventKind {
    /// The wire name of this event kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Cart => "cart",
            Self::Purchase => "purchase",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EventKind::View).unwrap(), "\"view\"");
        assert_eq!(
            serde_json::to_string(&EventKind::Purchase).unwrap(),
            "\"purchase\""
        );
    }

    #[test]
    fn test_deserializes_lowercase() {
        let kind: EventKind = serde_json::from_str("\"cart\"").unwrap();
        assert_eq!(kind, EventKind::Cart);
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(EventKind::Cart.to_string(), "cart");
    }
}
