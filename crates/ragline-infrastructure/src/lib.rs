//! Durable client-side state for the Ragline client.
//!
//! Platform paths, the atomic TOML state file, and the persistent
//! session store live here, behind the trait boundaries defined in
//! `ragline-core`.

pub mod paths;
pub mod session_store;
pub mod state_file;

pub use crate::paths::RaglinePaths;
pub use crate::session_store::PersistentSessionStore;
pub use crate::state_file::{ClientState, StateFile};
