//! Session identity.
//!
//! The backend correlates a client's conversation turns through an opaque
//! session identifier; no user authentication is involved. The store is an
//! injected interface so the persistent implementation can be swapped for
//! an in-memory one in tests or replaced by a server-issued variant later.

use tokio::sync::Mutex;
use uuid::Uuid;

/// An abstract store for the stable per-client session identifier.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session identifier, minting and persisting a fresh one
    /// on the first-ever call.
    ///
    /// This operation has no error path: a store that cannot reach its
    /// durable backing is expected to degrade to a process-lifetime
    /// identifier rather than fail.
    async fn get_or_create(&self) -> String;

    /// Forgets the persisted identifier. The next `get_or_create` mints a
    /// fresh one.
    async fn clear(&self) -> anyhow::Result<()>;
}

/// Session store that never touches durable storage.
///
/// Useful in tests and for embedders that manage persistence themselves.
/// The identifier lives for the lifetime of the value.
#[derive(Default)]
pub struct InMemorySessionStore {
    id: Mutex<Option<String>>,
}

impl InMemorySessionStore {
    /// Creates an empty store; the first `get_or_create` mints an identifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with a fixed identifier.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Mutex::new(Some(id.into())),
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self) -> String {
        let mut id = self.id.lock().await;
        id.get_or_insert_with(|| Uuid::new_v4().to_string()).clone()
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.id.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn consecutive_calls_return_the_same_id() {
        let store = InMemorySessionStore::new();
        let first = store.get_or_create().await;
        let second = store.get_or_create().await;
        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[tokio::test]
    async fn clear_mints_a_fresh_id() {
        let store = InMemorySessionStore::new();
        let first = store.get_or_create().await;
        store.clear().await.unwrap();
        let second = store.get_or_create().await;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn seeded_store_returns_the_seed() {
        let store = InMemorySessionStore::with_id("fixed-id");
        assert_eq!(store.get_or_create().await, "fixed-id");
    }
}
