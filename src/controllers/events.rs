use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::StoreError;
use crate::models::{Event, EventForm, EventView, Upload};
use crate::AppState;

/// Multipart field name carrying the image upload.
pub const IMAGE_FIELD: &str = "image";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/", get(list_events).post(create_event))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/", get(get_event))
}

// POST /events
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result: Result<Event, StoreError> = async {
        let multipart = multipart.map_err(|e| StoreError::Unexpected(e.body_text()))?;
        let form = read_form(multipart).await?;
        state.store.create(form.into_new_event()?).await
    }
    .await;

    match result {
        Ok(event) => {
            info!(event_id = %event.id, "Event created");
            (
                StatusCode::CREATED,
                Json(json!({
                    "success": true,
                    "message": "Event created successfully",
                    "data": event
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to create event: {:?}", e);
            failure("Failed to create event", &e)
        }
    }
}

// GET /events
pub async fn list_events(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list_all().await {
        Ok(events) => {
            let views: Vec<EventView> = events.into_iter().map(EventView::listed).collect();
            Json(views).into_response()
        }
        Err(e) => {
            error!("Error fetching events: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "message": "Error fetching events",
                    "error": e.to_string()
                })),
            )
                .into_response()
        }
    }
}

// GET /events/{id}
pub async fn get_event(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.store.get_by_id(&id).await {
        Ok(event) => Json(json!({
            "success": true,
            "data": EventView::detailed(event)
        }))
        .into_response(),
        Err(e) if e.is_not_found() => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "message": "Event not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(event_id = %id, "Failed to fetch event: {:?}", e);
            failure("Failed to fetch event", &e)
        }
    }
}

/// Collects text parts and at most one file, which must arrive under
/// [`IMAGE_FIELD`].
async fn read_form(mut multipart: Multipart) -> Result<EventForm, StoreError> {
    let mut form = EventForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StoreError::Unexpected(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if field.file_name().is_some() {
            if name != IMAGE_FIELD || form.image.is_some() {
                return Err(StoreError::validation(format!("Unexpected field: {name}")));
            }
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| StoreError::Unexpected(e.body_text()))?;
            form.image = Some(Upload {
                bytes: bytes.to_vec(),
                content_type,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| StoreError::Unexpected(e.body_text()))?;
            form.set_text(&name, value);
        }
    }

    Ok(form)
}

fn failure(message: &str, e: &StoreError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": message,
            "error": e.to_string()
        })),
    )
        .into_response()
}
