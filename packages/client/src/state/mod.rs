//! Client state store.
//!
//! The single authoritative in-memory state tree per connected client,
//! updated only through named transitions: a pure reducer plus an
//! observable store that serializes dispatch.

mod reducer;
mod store;

pub use reducer::{Action, AppState, reduce};
pub use store::StateStore;
