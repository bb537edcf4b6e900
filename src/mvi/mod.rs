//! Model-View-Intent primitives shared by the owner store and the view mirrors.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ push ──→ View mirror
//!    ↑                                          │
//!    └────────────── dispatch ──────────────────┘
//! ```
//!
//! - **State**: immutable, serializable tree owned by one process
//! - **Intent**: tagged request to transition the state
//! - **Reducer**: pure function that maps (state, intent) to the next state

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::StateTree;
