//! Base trait for replicated state in MVI architecture.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Marker trait for state trees.
///
/// States should be:
/// - Immutable (Clone to create new states)
/// - Serializable (replicated wholesale to every view)
/// - Comparable (PartialEq for detecting changes)
/// - Defaulted (a missing state or a missing slice has a documented value)
pub trait StateTree:
    Clone + PartialEq + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
}
