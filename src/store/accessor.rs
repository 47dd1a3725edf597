//! Typed property accessor over a [`StateStore`].

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DatabaseError;

use super::traits::StateStore;

/// One named property of every conversation, (de)serialized as `T`.
pub struct StateAccessor<T> {
    store: Arc<dyn StateStore>,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for StateAccessor<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T> StateAccessor<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn StateStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Load the property. A stored value that no longer parses as `T` is an
    /// error, not a silent reset.
    pub async fn get(&self, conversation_id: &str) -> Result<Option<T>, DatabaseError> {
        match self.store.get_state(conversation_id, self.key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| DatabaseError::Serialization(format!("{}: {e}", self.key))),
            None => Ok(None),
        }
    }

    /// Load the property or fall back to `T::default()`.
    pub async fn get_or_default(&self, conversation_id: &str) -> Result<T, DatabaseError>
    where
        T: Default,
    {
        Ok(self.get(conversation_id).await?.unwrap_or_default())
    }

    pub async fn set(&self, conversation_id: &str, value: &T) -> Result<(), DatabaseError> {
        let value = serde_json::to_value(value)
            .map_err(|e| DatabaseError::Serialization(format!("{}: {e}", self.key)))?;
        self.store.set_state(conversation_id, self.key, &value).await
    }

    pub async fn delete(&self, conversation_id: &str) -> Result<bool, DatabaseError> {
        self.store.delete_state(conversation_id, self.key).await
    }
}
