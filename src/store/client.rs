use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};

use crate::cart::{Cart, Product};
use crate::shutdown::{ShutdownHandle, StorePhase};

use super::types::{CartCommand, MutationOutcome, StoreError};

/// Consumer-side access to a running cart store.
///
/// Cheap to clone. Every mutation is queued on the store's single mailbox,
/// so concurrent callers never overwrite each other's changes.
#[derive(Clone)]
pub struct CartHandle {
    sender: mpsc::Sender<CartCommand>,
    updates: watch::Receiver<Cart>,
    shutdown: ShutdownHandle,
    timeout: Duration,
}

impl CartHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<CartCommand>,
        updates: watch::Receiver<Cart>,
        shutdown: ShutdownHandle,
        timeout: Duration,
    ) -> Self {
        Self {
            sender,
            updates,
            shutdown,
            timeout,
        }
    }

    /// Add one unit of `product`, creating its line item if needed.
    pub async fn add_to_cart(&self, product: Product) -> Result<MutationOutcome, StoreError> {
        let (respond_to, receiver) = oneshot::channel();
        self.send(CartCommand::AddToCart {
            product,
            respond_to,
        })
        .await?;

        self.recv_with_timeout(receiver).await
    }

    pub async fn increment(&self, id: impl Into<String>) -> Result<MutationOutcome, StoreError> {
        let (respond_to, receiver) = oneshot::channel();
        self.send(CartCommand::Increment {
            id: id.into(),
            respond_to,
        })
        .await?;

        self.recv_with_timeout(receiver).await
    }

    /// Remove one unit. A line item at zero stays at zero.
    pub async fn decrement(&self, id: impl Into<String>) -> Result<MutationOutcome, StoreError> {
        let (respond_to, receiver) = oneshot::channel();
        self.send(CartCommand::Decrement {
            id: id.into(),
            respond_to,
        })
        .await?;

        self.recv_with_timeout(receiver).await
    }

    /// Current cart, ordered as displayed.
    ///
    /// Answered after every command queued before it.
    pub async fn products(&self) -> Result<Cart, StoreError> {
        let (respond_to, receiver) = oneshot::channel();
        self.send(CartCommand::GetProducts { respond_to }).await?;

        self.recv_with_timeout(receiver).await
    }

    /// Receiver that always holds the latest cart, for rendering layers.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.updates.clone()
    }

    pub fn phase(&self) -> StorePhase {
        self.shutdown.phase()
    }

    /// Request scope exit. Queued commands are still applied.
    pub fn shutdown(&self) {
        self.shutdown.signal();
    }

    async fn send(&self, command: CartCommand) -> Result<(), StoreError> {
        if self.shutdown.is_shutting_down() {
            return Err(StoreError::OutsideScope);
        }
        self.sender
            .send(command)
            .await
            .map_err(|_| StoreError::OutsideScope)
    }

    async fn recv_with_timeout<T>(&self, receiver: oneshot::Receiver<T>) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, receiver).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(StoreError::OutsideScope),
            Err(_) => Err(StoreError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}
