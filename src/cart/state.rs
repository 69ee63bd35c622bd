use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mvi::State;

/// Why a product cannot enter the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidProduct {
    #[error("product id is empty")]
    EmptyId,

    #[error("product price is not a finite number")]
    NonFinitePrice,
}

/// Product descriptor offered to `add_to_cart`. Carries no quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier, the only lookup key.
    pub id: String,
    pub title: String,
    pub image_url: String,
    /// Unit price.
    pub price: f64,
}

impl Product {
    /// Checks the fields a persisted snapshot must be able to hold.
    ///
    /// JSON has no NaN or infinity, so a non-finite price would not reload.
    pub fn validate(&self) -> Result<(), InvalidProduct> {
        if self.id.is_empty() {
            return Err(InvalidProduct::EmptyId);
        }
        if !self.price.is_finite() {
            return Err(InvalidProduct::NonFinitePrice);
        }
        Ok(())
    }
}

/// One product in the cart.
///
/// Field names are part of the persisted snapshot format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
}

impl LineItem {
    pub fn from_product(product: Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            image_url: product.image_url,
            price: product.price,
            quantity,
        }
    }

    /// `price * quantity`.
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Ordered list of line items. Insertion order is display order.
///
/// Holds at most one line item per id; the reducer is the only writer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    pub(crate) items: Vec<LineItem>,
}

impl State for Cart {}

impl Cart {
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn quantity_of(&self, id: &str) -> Option<u32> {
        self.get(id).map(|item| item.quantity)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities over all line items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price * quantity` over all line items.
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, price: f64, quantity: u32) -> LineItem {
        LineItem {
            id: id.to_string(),
            title: id.to_uppercase(),
            image_url: format!("https://img.example.com/{id}.png"),
            price,
            quantity,
        }
    }

    #[test]
    fn totals_cover_all_lines() {
        let cart = Cart {
            items: vec![item("a", 10.0, 2), item("b", 2.5, 4), item("c", 99.0, 0)],
        };
        assert_eq!(cart.total_quantity(), 6);
        assert!((cart.total_price() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_rejects_what_a_snapshot_cannot_reload() {
        let product = |id: &str, price: f64| Product {
            id: id.to_string(),
            title: "Shoe".to_string(),
            image_url: "u".to_string(),
            price,
        };
        assert_eq!(product("a", 10.0).validate(), Ok(()));
        assert_eq!(product("", 10.0).validate(), Err(InvalidProduct::EmptyId));
        assert_eq!(
            product("a", f64::NAN).validate(),
            Err(InvalidProduct::NonFinitePrice)
        );
        assert_eq!(
            product("a", f64::NEG_INFINITY).validate(),
            Err(InvalidProduct::NonFinitePrice)
        );
    }

    #[test]
    fn serializes_as_plain_array() {
        let cart = Cart {
            items: vec![item("a", 10.0, 1)],
        };
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["image_url"], "https://img.example.com/a.png");
        assert_eq!(json[0]["quantity"], 1);
    }
}
