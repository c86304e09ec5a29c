//! Persistence for [`Event`] records.
//!
//! The store is append/read only: there is no update or delete.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Event, NewEvent};

pub use memory::InMemoryEventStore;
pub use postgres::PgEventStore;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Validates `event`, assigns a fresh id and creation time, and persists it.
    /// Nothing is written when validation fails.
    async fn create(&self, event: NewEvent) -> Result<Event, StoreError>;

    /// Every stored event, in whatever order the backend yields them.
    async fn list_all(&self) -> Result<Vec<Event>, StoreError>;

    /// Looks up one event. `id` is the textual form received from a client.
    async fn get_by_id(&self, id: &str) -> Result<Event, StoreError>;
}

/// Parses a client-supplied id, reporting [`StoreError::InvalidId`] for anything
/// that is not a UUID.
pub fn parse_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id.trim()).map_err(|_| StoreError::InvalidId(id.to_string()))
}
