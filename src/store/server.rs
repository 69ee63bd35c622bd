use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use crate::cart::{Cart, CartIntent, CartReducer};
use crate::config::{PersistPolicy, StoreConfig};
use crate::mvi::Reducer;
use crate::shutdown::{ShutdownCoordinator, StorePhase};
use crate::snapshot;
use crate::storage::KeyValueStore;

use super::types::{CartCommand, MutationOutcome, Persistence};

/// The single owner of the cart.
///
/// Loads the persisted snapshot, then applies commands from the mailbox one
/// at a time, writing the full cart back after every applied mutation.
pub struct CartServer {
    receiver: mpsc::Receiver<CartCommand>,
    updates: watch::Sender<Cart>,
    coordinator: ShutdownCoordinator,
    config: StoreConfig,
    cart: Cart,
    /// Set when the last snapshot write failed.
    dirty: bool,
}

impl CartServer {
    pub(crate) fn new(
        receiver: mpsc::Receiver<CartCommand>,
        updates: watch::Sender<Cart>,
        coordinator: ShutdownCoordinator,
        config: StoreConfig,
    ) -> Self {
        Self {
            receiver,
            updates,
            coordinator,
            config,
            cart: Cart::default(),
            dirty: false,
        }
    }

    /// Run until every handle is dropped or shutdown is requested.
    ///
    /// Returns the final cart.
    pub async fn run(mut self, storage: Arc<dyn KeyValueStore>) -> Cart {
        self.initialize(storage.as_ref()).await;
        self.coordinator.advance(StorePhase::Ready);

        let shutdown = self.coordinator.handle();
        loop {
            tokio::select! {
                biased;
                command = self.receiver.recv() => match command {
                    Some(command) => self.handle(command, storage.as_ref()).await,
                    None => break,
                },
                _ = shutdown.wait() => break,
            }
        }

        self.coordinator.advance(StorePhase::Draining);
        self.receiver.close();
        while let Some(command) = self.receiver.recv().await {
            self.handle(command, storage.as_ref()).await;
        }

        if self.dirty {
            tracing::info!(key = %self.config.storage_key, "Flushing unsaved cart before exit");
            self.persist(storage.as_ref()).await;
        }

        self.coordinator.advance(StorePhase::Closed);
        self.cart
    }

    /// Replace the empty cart with the persisted snapshot, if any.
    ///
    /// Unreadable or malformed snapshots leave the cart empty.
    async fn initialize(&mut self, storage: &dyn KeyValueStore) {
        let key = self.config.storage_key.as_str();
        let loaded = match storage.get(key).await {
            Ok(Some(raw)) => match snapshot::decode(&raw) {
                Ok(cart) => cart,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Ignoring unusable cart snapshot");
                    return;
                }
            },
            Ok(None) => {
                tracing::debug!(key = %key, "No persisted cart, starting empty");
                return;
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read cart snapshot, starting empty");
                return;
            }
        };

        tracing::info!(key = %key, items = loaded.len(), "Loaded persisted cart");
        self.apply(CartIntent::Replace(loaded));
    }

    async fn handle(&mut self, command: CartCommand, storage: &dyn KeyValueStore) {
        match command {
            CartCommand::AddToCart {
                product,
                respond_to,
            } => {
                if let Err(reason) = product.validate() {
                    tracing::warn!(id = %product.id, error = %reason, "Refusing product");
                    respond(
                        respond_to,
                        MutationOutcome::Rejected {
                            id: product.id,
                            reason,
                        },
                    );
                    return;
                }
                let id = product.id.clone();
                self.apply(CartIntent::Add(product));
                self.commit(id, respond_to, storage).await;
            }
            CartCommand::Increment { id, respond_to } => {
                if self.is_missing(&id) {
                    respond(respond_to, MutationOutcome::NotFound { id });
                    return;
                }
                self.apply(CartIntent::Increment(id.clone()));
                self.commit(id, respond_to, storage).await;
            }
            CartCommand::Decrement { id, respond_to } => {
                if self.is_missing(&id) {
                    respond(respond_to, MutationOutcome::NotFound { id });
                    return;
                }
                self.apply(CartIntent::Decrement(id.clone()));
                self.commit(id, respond_to, storage).await;
            }
            CartCommand::GetProducts { respond_to } => {
                if respond_to.send(self.cart.clone()).is_err() {
                    tracing::trace!("GetProducts response dropped (receiver gone)");
                }
            }
        }
    }

    fn is_missing(&self, id: &str) -> bool {
        if self.cart.contains(id) {
            return false;
        }
        tracing::debug!(id = %id, "Cart has no line item with this id, ignoring");
        true
    }

    fn apply(&mut self, intent: CartIntent) {
        self.cart = CartReducer::reduce(std::mem::take(&mut self.cart), intent);
        self.updates.send_replace(self.cart.clone());
    }

    /// Persist the current cart and answer the caller, in the order the
    /// configured policy asks for.
    async fn commit(
        &mut self,
        id: String,
        respond_to: oneshot::Sender<MutationOutcome>,
        storage: &dyn KeyValueStore,
    ) {
        let quantity = self.cart.quantity_of(&id).unwrap_or(0);
        tracing::debug!(id = %id, quantity, "Cart updated");

        match self.config.persist_policy {
            PersistPolicy::WriteThrough => {
                let deadline = self.config.write_through_deadline();
                let mut persist = std::pin::pin!(self.persist(storage));
                match tokio::time::timeout(deadline, persist.as_mut()).await {
                    Ok(persistence) => respond(
                        respond_to,
                        MutationOutcome::Applied {
                            id,
                            quantity,
                            persistence,
                        },
                    ),
                    Err(_) => {
                        tracing::debug!(id = %id, "Snapshot write still running, answering as pending");
                        respond(
                            respond_to,
                            MutationOutcome::Applied {
                                id,
                                quantity,
                                persistence: Persistence::Pending,
                            },
                        );
                        persist.await;
                    }
                }
            }
            PersistPolicy::Eventual => {
                respond(
                    respond_to,
                    MutationOutcome::Applied {
                        id,
                        quantity,
                        persistence: Persistence::Pending,
                    },
                );
                self.persist(storage).await;
            }
        }
    }

    /// Write the full cart, retrying with linear backoff.
    async fn persist(&mut self, storage: &dyn KeyValueStore) -> Persistence {
        let key = self.config.storage_key.as_str();
        let value = match snapshot::encode(&self.cart) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to encode cart snapshot");
                self.dirty = true;
                return Persistence::Failed;
            }
        };

        let attempts = self.config.persist_retries.saturating_add(1);
        for attempt in 1..=attempts {
            match storage.set(key, &value).await {
                Ok(()) => {
                    self.dirty = false;
                    return Persistence::Flushed;
                }
                Err(e) => {
                    tracing::warn!(key = %key, attempt, attempts, error = %e, "Cart snapshot write failed");
                    if attempt < attempts {
                        tokio::time::sleep(self.config.persist_backoff() * attempt).await;
                    }
                }
            }
        }

        self.dirty = true;
        Persistence::Failed
    }
}

fn respond(respond_to: oneshot::Sender<MutationOutcome>, outcome: MutationOutcome) {
    if respond_to.send(outcome).is_err() {
        tracing::trace!("Cart mutation response dropped (receiver gone)");
    }
}
