//! Cross-process bridge between the owner store and view mirrors.
//!
//! Three messages cross the boundary:
//!
//! | message     | direction        | shape                                  |
//! |-------------|------------------|----------------------------------------|
//! | `getState`  | view → owner     | request/response, returns a snapshot   |
//! | `dispatch`  | view → owner     | fire-and-forget, carries one intent    |
//! | `subscribe` | owner → all views| broadcast, full state after each commit|
//!
//! The owner half ([`OwnerBridge`]) and the view half ([`ViewBridge`]) talk
//! through a [`ViewEndpoint`]. In-process endpoints come straight from the
//! owner; [`stream::connect`] builds the same endpoint over a byte stream.

mod error;
mod owner;
pub mod stream;
mod view;

pub use error::BridgeError;
pub use owner::{BridgeSettings, DispatchPolicy, Dispatcher, OwnerBridge};
pub use view::{Versioned, ViewBridge, ViewEndpoint, ViewSubscription};
