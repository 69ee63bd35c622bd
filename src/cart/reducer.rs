use crate::cart::intent::CartIntent;
use crate::cart::state::{Cart, LineItem};
use crate::mvi::Reducer;

pub struct CartReducer;

impl Reducer for CartReducer {
    type State = Cart;
    type Intent = CartIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            CartIntent::Add(product) => {
                let mut cart = state;
                match cart.get_mut(&product.id) {
                    Some(item) => item.quantity = item.quantity.saturating_add(1),
                    None => cart.items.push(LineItem::from_product(product, 1)),
                }
                cart
            }
            CartIntent::Increment(id) => {
                let mut cart = state;
                if let Some(item) = cart.get_mut(&id) {
                    item.quantity = item.quantity.saturating_add(1);
                }
                cart
            }
            CartIntent::Decrement(id) => {
                let mut cart = state;
                if let Some(item) = cart.get_mut(&id) {
                    // Zero-quantity lines stay in the cart so they can be re-incremented.
                    item.quantity = item.quantity.saturating_sub(1);
                }
                cart
            }
            CartIntent::Replace(cart) => cart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Product;

    fn shoe() -> Product {
        Product {
            id: "a".to_string(),
            title: "Shoe".to_string(),
            image_url: "u".to_string(),
            price: 10.0,
        }
    }

    #[test]
    fn add_new_product_appends_with_quantity_one() {
        let cart = CartReducer::reduce(Cart::default(), CartIntent::Add(shoe()));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.items()[0].title, "Shoe");
    }

    #[test]
    fn add_existing_product_bumps_quantity_in_place() {
        let cart = CartReducer::reduce(Cart::default(), CartIntent::Add(shoe()));
        let cart = CartReducer::reduce(cart, CartIntent::Add(shoe()));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of("a"), Some(2));
    }

    #[test]
    fn increment_saturates_at_max() {
        let mut cart = CartReducer::reduce(Cart::default(), CartIntent::Add(shoe()));
        if let Some(item) = cart.get_mut("a") {
            item.quantity = u32::MAX;
        }
        let cart = CartReducer::reduce(cart, CartIntent::Increment("a".to_string()));
        assert_eq!(cart.quantity_of("a"), Some(u32::MAX));
    }

    #[test]
    fn replace_discards_previous_state() {
        let cart = CartReducer::reduce(Cart::default(), CartIntent::Add(shoe()));
        let cart = CartReducer::reduce(cart, CartIntent::Replace(Cart::default()));
        assert!(cart.is_empty());
    }
}
