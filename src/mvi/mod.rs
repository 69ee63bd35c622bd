//! Model-View-Intent (MVI) primitives for cart state.
//!
//! Every change to the cart flows in one direction:
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ Subscribers
//!    ↑                                  │
//!    └──────────────────────────────────┘
//! ```
//!
//! - **State**: owned snapshot of the data a consumer renders
//! - **Intent**: a requested change (add, increment, ...)
//! - **Reducer**: pure function that produces the next state

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::State;
