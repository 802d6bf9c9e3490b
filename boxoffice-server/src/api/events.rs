use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use boxoffice_core::entities::NewEvent;
use boxoffice_sdk::objects::{CreateEventRequest, ListEventsResponse};
use uuid::Uuid;

use super::{ApiError, event_to_response};
use crate::state::AppState;

/// `GET /events`: list all events, soonest first.
pub(super) async fn list_events(state: State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let events = state.box_office.list_events().await?;
    Ok(Json(ListEventsResponse {
        events: events.iter().map(event_to_response).collect(),
    }))
}

/// `GET /events/{event_id}`
pub(super) async fn get_event(
    state: State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.box_office.get_event(event_id).await?;
    Ok(Json(event_to_response(&event)))
}

/// `POST /events`: create an event.
pub(super) async fn create_event(
    state: State<AppState>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state
        .box_office
        .create_event(NewEvent {
            name: payload.name,
            location: payload.location,
            organization: payload.organization,
            rating: payload.rating.into(),
            date: payload.date,
            image_url: payload.image_url,
            capacity: payload.capacity,
            price: payload.price,
            partner_id: payload.partner_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(event_to_response(&event))))
}
