//! `StateStore` trait: async per-conversation key/value persistence.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// Backend-agnostic store for conversation-scoped JSON values.
///
/// Every entry is addressed by `(conversation_id, key)`. Values are opaque
/// JSON; typed access goes through [`StateAccessor`](super::StateAccessor).
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read a value, `None` when the key was never written or was deleted.
    async fn get_state(
        &self,
        conversation_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, DatabaseError>;

    /// Insert or overwrite a value.
    async fn set_state(
        &self,
        conversation_id: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), DatabaseError>;

    /// Remove a value. Returns whether anything was deleted.
    async fn delete_state(&self, conversation_id: &str, key: &str) -> Result<bool, DatabaseError>;
}
