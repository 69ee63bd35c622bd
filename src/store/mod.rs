//! The cart store: one task owns the cart, consumers talk to it through
//! [`CartHandle`].
//!
//! Mutations are serialized through a single mailbox, so two callers racing
//! on the same line item both land. The persisted snapshot is loaded before
//! the first command is applied and rewritten after every mutation.

mod client;
mod server;
mod types;


use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::cart::Cart;
use crate::config::StoreConfig;
use crate::shutdown::ShutdownCoordinator;
use crate::storage::KeyValueStore;

pub use client::CartHandle;
pub use server::CartServer;
pub use types::{CartCommand, MutationOutcome, Persistence, StoreError};

pub struct CartLayer;

impl CartLayer {
    /// Build a connected handle/server pair. The server does nothing until
    /// [`CartServer::run`] is awaited.
    pub fn new(config: StoreConfig) -> (CartHandle, CartServer) {
        let (sender, receiver) = mpsc::channel(config.mailbox_capacity.max(1));
        let (updates_tx, updates_rx) = watch::channel(Cart::default());
        let coordinator = ShutdownCoordinator::new();
        let handle = CartHandle::new(
            sender,
            updates_rx,
            coordinator.handle(),
            config.request_timeout(),
        );
        let server = CartServer::new(receiver, updates_tx, coordinator, config);
        (handle, server)
    }
}

/// An active cart store: the spawned server task plus a handle to it.
///
/// Dropping the scope without [`CartScope::close`] leaves the task running
/// until every handle is gone.
pub struct CartScope {
    handle: CartHandle,
    task: JoinHandle<Cart>,
}

impl CartScope {
    /// Spawn the store on the current tokio runtime.
    pub fn spawn(storage: Arc<dyn KeyValueStore>, config: StoreConfig) -> Self {
        let (handle, server) = CartLayer::new(config);
        let task = tokio::spawn(server.run(storage));
        Self { handle, task }
    }

    pub fn handle(&self) -> CartHandle {
        self.handle.clone()
    }

    /// End the scope: apply queued commands, flush, stop the task.
    ///
    /// Returns the final cart, or `None` if the store task panicked.
    pub async fn close(self) -> Option<Cart> {
        self.handle.shutdown();
        match self.task.await {
            Ok(cart) => Some(cart),
            Err(e) => {
                tracing::error!(error = %e, "Cart store task failed");
                None
            }
        }
    }
}
