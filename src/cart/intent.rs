use crate::cart::state::{Cart, Product};
use crate::mvi::Intent;

#[derive(Debug, Clone, PartialEq)]
pub enum CartIntent {
    /// Append the product with quantity 1, or bump the existing line by one.
    Add(Product),
    /// Increase by one, saturating. Unknown ids leave the cart unchanged.
    Increment(String),
    /// Decrease by one. Floors at zero; the line item is kept.
    Decrement(String),
    /// Wholesale replacement with a loaded snapshot.
    Replace(Cart),
}

impl Intent for CartIntent {}
