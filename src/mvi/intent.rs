//! Base trait for intents in MVI architecture.

use crate::protocol::WireIntent;

/// An intent that can cross the process boundary.
///
/// Intents are closed enums on the Rust side and `{ type, payload }` records
/// on the wire. Decoding must be total: anything the enum does not know about
/// becomes a variant every reducer ignores.
pub trait Intent: Clone + std::fmt::Debug + Send + 'static {
    /// Decode a wire record. Never fails.
    fn from_wire(wire: &WireIntent) -> Self;

    /// Encode into the wire record the owner understands.
    fn to_wire(&self) -> WireIntent;
}
