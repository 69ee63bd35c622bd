//! Cart domain model and its state transitions.

mod intent;
mod reducer;
mod state;

pub use intent::CartIntent;
pub use reducer::CartReducer;
pub use state::{Cart, InvalidProduct, LineItem, Product};
