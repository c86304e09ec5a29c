use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{parse_id, EventStore};
use crate::error::StoreError;
use crate::models::{Event, NewEvent};

/// Process-local store. Used with `STORE_BACKEND=memory` and by the tests.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<Event>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create(&self, event: NewEvent) -> Result<Event, StoreError> {
        let event = event.normalized()?.into_event(Uuid::new_v4(), Utc::now());
        self.events.write().await.push(event.clone());
        Ok(event)
    }

    async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Event, StoreError> {
        let id = parse_id(id)?;
        self.events
            .read()
            .await
            .iter()
            .find(|event| event.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}
