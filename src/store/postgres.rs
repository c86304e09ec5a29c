use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{parse_id, EventStore};
use crate::database::Database;
use crate::error::StoreError;
use crate::models::{Event, NewEvent};

const EVENT_COLUMNS: &str = "id, title, description, location, date, max_participants, \
     current_participants, image, image_type, created_at";

/// `events` table store. Images live inline in a `BYTEA` column.
#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool.clone(),
        }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create(&self, event: NewEvent) -> Result<Event, StoreError> {
        let event = event.normalized()?.into_event(Uuid::new_v4(), Utc::now());

        let sql = format!(
            "INSERT INTO events ({EVENT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {EVENT_COLUMNS}"
        );

        let stored = sqlx::query_as::<_, Event>(&sql)
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.date)
            .bind(event.max_participants)
            .bind(event.current_participants)
            .bind(event.image.as_deref())
            .bind(event.image_type.as_deref())
            .bind(event.created_at)
            .fetch_one(&self.pool)
            .await?;

        debug!(event_id = %stored.id, "event row inserted");
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events");

        let events: Vec<Event> = sqlx::query_as::<_, Event>(&sql)
            .fetch(&self.pool)
            .try_collect()
            .await?;

        Ok(events)
    }

    async fn get_by_id(&self, id: &str) -> Result<Event, StoreError> {
        let id = parse_id(id)?;
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");

        sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }
}
