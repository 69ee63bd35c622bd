//! Base trait for state in MVI architecture.

/// Marker trait for state objects.
///
/// States should be:
/// - Owned (Clone to hand a copy to readers)
/// - Comparable (PartialEq for detecting changes)
/// - Empty by default
pub trait State: Clone + PartialEq + Default + Send + Sync + 'static {}
