//! Shopping-cart state container with durable key-value persistence.
//!
//! A [`store::CartScope`] owns the cart on a single task. Consumers use a
//! [`store::CartHandle`] to add products, bump quantities up or down and read
//! the current cart. Every mutation is written back to a
//! [`storage::KeyValueStore`] as a full snapshot.

pub mod cart;
pub mod cli;
pub mod config;
pub mod logging;
pub mod mvi;
pub mod shutdown;
pub mod snapshot;
pub mod storage;
pub mod store;
