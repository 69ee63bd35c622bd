//! Base trait for intents in MVI architecture.

/// Marker trait for intent objects.
///
/// Intents are requested changes to a state. They cross the store
/// mailbox, so they must be `Send`.
pub trait Intent: Send + 'static {}
