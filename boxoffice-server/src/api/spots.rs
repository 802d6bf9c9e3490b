use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use boxoffice_sdk::objects::{CreateSpotsRequest, CreateSpotsResponse, ListSpotsResponse};
use uuid::Uuid;

use super::{ApiError, event_to_response, spot_to_response};
use crate::state::AppState;

/// `GET /events/{event_id}/spots`: the event together with its spots.
pub(super) async fn list_spots(
    state: State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let (event, spots) = state.box_office.list_spots(event_id).await?;
    Ok(Json(ListSpotsResponse {
        event: event_to_response(&event),
        spots: spots.iter().map(spot_to_response).collect(),
    }))
}

/// `POST /events/{event_id}/spots`: append `number_of_spots` spots.
pub(super) async fn create_spots(
    state: State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<CreateSpotsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let spots = state
        .box_office
        .create_spots(event_id, payload.number_of_spots as usize)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSpotsResponse {
            spots: spots.iter().map(spot_to_response).collect(),
        }),
    ))
}
