use thiserror::Error;
use tokio::sync::oneshot;

use crate::cart::{Cart, InvalidProduct, Product};

/// Errors surfaced to cart consumers.
///
/// Storage and lookup failures are handled inside the store and never
/// show up here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The handle was used after its cart store scope ended.
    #[error("cart handle used outside an active cart store scope")]
    OutsideScope,

    /// No answer in time. The command may still be applied; read the cart
    /// with `products()` before retrying a mutation.
    #[error("cart store did not answer within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Whether the snapshot reflecting a mutation reached storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Written before the caller was answered.
    Flushed,
    /// Not written yet. The write finishes before the next command is
    /// applied.
    Pending,
    /// Every attempt failed. The in-memory cart still holds the change and
    /// the store retries on its next write or at scope exit.
    Failed,
}

/// Result of a cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied {
        id: String,
        quantity: u32,
        persistence: Persistence,
    },
    /// No line item with this id; the cart was left untouched.
    NotFound { id: String },
    /// The product was refused; the cart was left untouched.
    Rejected { id: String, reason: InvalidProduct },
}

impl MutationOutcome {
    /// Quantity after the mutation, `None` when nothing was applied.
    pub fn quantity(&self) -> Option<u32> {
        match self {
            MutationOutcome::Applied { quantity, .. } => Some(*quantity),
            MutationOutcome::NotFound { .. } | MutationOutcome::Rejected { .. } => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, MutationOutcome::Applied { .. })
    }
}

pub enum CartCommand {
    AddToCart {
        product: Product,
        respond_to: oneshot::Sender<MutationOutcome>,
    },
    Increment {
        id: String,
        respond_to: oneshot::Sender<MutationOutcome>,
    },
    Decrement {
        id: String,
        respond_to: oneshot::Sender<MutationOutcome>,
    },
    GetProducts {
        respond_to: oneshot::Sender<Cart>,
    },
}
