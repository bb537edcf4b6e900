//! Cross-process Redux-style state synchronization.
//!
//! One owner process holds the authoritative [`store::Store`]; any number of
//! view processes hold read-only mirrors ([`view_store::ViewStore`]) kept up to
//! date by full-state pushes, and send intents back through the
//! [`bridge`]. Window and tray lifecycles are driven by state through the
//! [`effects::SideEffectRouter`] middleware.

pub mod app;
pub mod bridge;
pub mod cli;
pub mod config;
pub mod effects;
pub mod logging;
pub mod mvi;
pub mod protocol;
pub mod reducers;
pub mod shutdown;
pub mod store;
pub mod view_store;
