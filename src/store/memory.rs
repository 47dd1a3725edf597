//! In-memory `StateStore` for tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DatabaseError;

use super::traits::StateStore;

/// Process-local store. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<(String, String), serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all conversations.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get_state(
        &self,
        conversation_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, DatabaseError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(conversation_id.to_string(), key.to_string()))
            .cloned())
    }

    async fn set_state(
        &self,
        conversation_id: &str,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<(), DatabaseError> {
        self.entries
            .write()
            .await
            .insert((conversation_id.to_string(), key.to_string()), value.clone());
        Ok(())
    }

    async fn delete_state(&self, conversation_id: &str, key: &str) -> Result<bool, DatabaseError> {
        Ok(self
            .entries
            .write()
            .await
            .remove(&(conversation_id.to_string(), key.to_string()))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn entries_are_scoped_by_conversation() {
        let store = MemoryStore::new();
        store.set_state("a", "k", &json!(1)).await.unwrap();
        store.set_state("b", "k", &json!(2)).await.unwrap();

        assert_eq!(store.get_state("a", "k").await.unwrap(), Some(json!(1)));
        assert_eq!(store.get_state("b", "k").await.unwrap(), Some(json!(2)));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn overwrite_and_delete() {
        let store = MemoryStore::new();
        store.set_state("a", "k", &json!("old")).await.unwrap();
        store.set_state("a", "k", &json!("new")).await.unwrap();
        assert_eq!(store.get_state("a", "k").await.unwrap(), Some(json!("new")));

        assert!(store.delete_state("a", "k").await.unwrap());
        assert!(store.is_empty().await);
        assert!(!store.delete_state("a", "k").await.unwrap());
    }
}
