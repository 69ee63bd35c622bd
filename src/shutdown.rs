use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Lifecycle of a cart store scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StorePhase {
    /// Spawned, snapshot not loaded yet. Commands queue up.
    Uninitialized = 0,
    /// Snapshot loaded, commands are being applied.
    Ready = 1,
    /// Scope exit requested; draining queued commands and flushing.
    Draining = 2,
    Closed = 3,
}

impl StorePhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => StorePhase::Uninitialized,
            1 => StorePhase::Ready,
            2 => StorePhase::Draining,
            _ => StorePhase::Closed,
        }
    }
}

/// Owned by the store task. Drives the phase and observes shutdown requests.
pub struct ShutdownCoordinator {
    shutdown: Arc<AtomicBool>,
    phase: Arc<AtomicU8>,
    notify: Arc<Notify>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
            phase: Arc::new(AtomicU8::new(StorePhase::Uninitialized as u8)),
            notify: Arc::new(Notify::new()),
        }
    }

    pub fn phase(&self) -> StorePhase {
        StorePhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Advance to `phase`.
    pub fn advance(&self, phase: StorePhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
        tracing::debug!(phase = ?phase, "Cart store phase changed");
    }

    /// Create a handle for sharing
    pub fn handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: Arc::clone(&self.shutdown),
            phase: Arc::clone(&self.phase),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lightweight handle for requesting and observing shutdown.
#[derive(Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<AtomicBool>,
    phase: Arc<AtomicU8>,
    notify: Arc<Notify>,
}

impl ShutdownHandle {
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> StorePhase {
        StorePhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn signal(&self) {
        if !self.shutdown.swap(true, Ordering::SeqCst) {
            tracing::info!("Cart store shutdown requested");
            self.notify.notify_waiters();
        }
    }

    pub async fn wait(&self) {
        // Register with Notify before reading the flag, otherwise a signal
        // landing between the two would be missed.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_shutting_down() {
            return;
        }
        notified.await;
    }
}
