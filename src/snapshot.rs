//! Persisted cart snapshot format.
//!
//! A snapshot is the JSON array of every line item in display order, with
//! fields `id`, `title`, `image_url`, `price` and `quantity`. It always holds
//! the full cart, never a diff.

use std::collections::HashSet;

use thiserror::Error;

use crate::cart::{Cart, LineItem};

/// Storage key the cart snapshot lives under.
pub const CART_STORAGE_KEY: &str = "@GoMarketPlace:car_products";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to encode cart snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Malformed cart snapshot: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Cart snapshot entry {index} has an empty id")]
    MissingId { index: usize },

    #[error("Cart snapshot contains id '{0}' more than once")]
    DuplicateId(String),

    #[error("Cart snapshot entry '{id}' has a price JSON cannot represent")]
    NonFinitePrice { id: String },
}

/// Serialize the whole cart.
///
/// Refuses any cart [`decode`] would reject, so a written snapshot always
/// reloads.
pub fn encode(cart: &Cart) -> Result<String, SnapshotError> {
    check_entries(cart.items())?;
    serde_json::to_string(cart).map_err(SnapshotError::Encode)
}

/// Parse a snapshot and check the one-entry-per-id invariant.
///
/// Callers treat any error as "no usable snapshot".
pub fn decode(raw: &str) -> Result<Cart, SnapshotError> {
    let items: Vec<LineItem> = serde_json::from_str(raw).map_err(SnapshotError::Parse)?;
    check_entries(&items)?;
    Ok(Cart { items })
}

fn check_entries(items: &[LineItem]) -> Result<(), SnapshotError> {
    let mut seen = HashSet::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if item.id.is_empty() {
            return Err(SnapshotError::MissingId { index });
        }
        if !item.price.is_finite() {
            return Err(SnapshotError::NonFinitePrice {
                id: item.id.clone(),
            });
        }
        if !seen.insert(item.id.as_str()) {
            return Err(SnapshotError::DuplicateId(item.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_accepts_snapshot_written_by_mobile_app() {
        let raw = r#"[{"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":2}]"#;
        let cart = decode(raw).unwrap();
        assert_eq!(cart.quantity_of("a"), Some(2));
        assert!((cart.items()[0].price - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn decode_rejects_non_array() {
        assert!(matches!(
            decode(r#"{"id":"a"}"#),
            Err(SnapshotError::Parse(_))
        ));
    }

    #[test]
    fn decode_rejects_negative_quantity() {
        let raw = r#"[{"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":-1}]"#;
        assert!(matches!(decode(raw), Err(SnapshotError::Parse(_))));
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let raw = r#"[{"id":"a","title":"Shoe"}]"#;
        assert!(matches!(decode(raw), Err(SnapshotError::Parse(_))));
    }

    #[test]
    fn decode_rejects_empty_id() {
        let raw = r#"[{"id":"","title":"Shoe","image_url":"u","price":10,"quantity":1}]"#;
        assert!(matches!(
            decode(raw),
            Err(SnapshotError::MissingId { index: 0 })
        ));
    }

    #[test]
    fn decode_rejects_duplicate_ids() {
        let raw = r#"[
            {"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":1},
            {"id":"a","title":"Shoe","image_url":"u","price":10,"quantity":3}
        ]"#;
        assert!(matches!(decode(raw), Err(SnapshotError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn encode_refuses_carts_decode_would_reject() {
        let line = |id: &str, price: f64| LineItem {
            id: id.to_string(),
            title: "Shoe".to_string(),
            image_url: "u".to_string(),
            price,
            quantity: 1,
        };

        let cart = Cart {
            items: vec![line("a", 10.0), line("b", f64::INFINITY)],
        };
        assert!(matches!(
            encode(&cart),
            Err(SnapshotError::NonFinitePrice { id }) if id == "b"
        ));

        let cart = Cart {
            items: vec![line("a", 10.0), line("", 10.0)],
        };
        assert!(matches!(
            encode(&cart),
            Err(SnapshotError::MissingId { index: 1 })
        ));

        let cart = Cart {
            items: vec![line("a", 10.0), line("b", 2.5)],
        };
        assert_eq!(decode(&encode(&cart).unwrap()).unwrap(), cart);
    }

    #[test]
    fn empty_array_is_an_empty_cart() {
        assert!(decode("[]").unwrap().is_empty());
    }
}
