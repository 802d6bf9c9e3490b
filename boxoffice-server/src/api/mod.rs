//! HTTP API handlers.
//!
//! # Endpoints
//!
//! - `GET  /events`                   – list events
//! - `POST /events`                   – create an event
//! - `GET  /events/{event_id}`        – show one event
//! - `GET  /events/{event_id}/spots`  – show an event with its spots
//! - `POST /events/{event_id}/spots`  – generate spots for an event
//! - `POST /checkout`                 – buy tickets through the event's partner

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use boxoffice_core::entities::{Event, Spot, Ticket};
use boxoffice_core::{Error, ErrorKind};
use boxoffice_sdk::objects::{ErrorResponse, EventResponse, SpotResponse, TicketResponse};

use crate::state::AppState;

mod checkout;
mod events;
mod spots;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/{event_id}", get(events::get_event))
        .route(
            "/events/{event_id}/spots",
            get(spots::list_spots).post(spots::create_spots),
        )
        .route("/checkout", post(checkout::buy_tickets))
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// A workflow error on its way to the client.
#[derive(Debug)]
pub(crate) struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidState => StatusCode::CONFLICT,
            ErrorKind::UnknownPartner
            | ErrorKind::PartnerUnavailable
            | ErrorKind::PartnerRejected
            | ErrorKind::PartnerProtocol => StatusCode::BAD_GATEWAY,
            ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self.0.kind() {
            ErrorKind::Storage => {
                tracing::error!(error = %self.0, "API database error");
                "internal server error".to_string()
            }
            ErrorKind::UnknownPartner
            | ErrorKind::PartnerUnavailable
            | ErrorKind::PartnerRejected
            | ErrorKind::PartnerProtocol => {
                tracing::warn!(error = %self.0, "partner failure");
                self.0.to_string()
            }
            _ => self.0.to_string(),
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub(crate) fn event_to_response(e: &Event) -> EventResponse {
    EventResponse {
        id: e.id,
        name: e.name.clone(),
        location: e.location.clone(),
        organization: e.organization.clone(),
        rating: e.rating.into(),
        date: e.date,
        image_url: e.image_url.clone(),
        capacity: e.capacity,
        price: e.price,
        partner_id: e.partner_id,
    }
}

pub(crate) fn spot_to_response(s: &Spot) -> SpotResponse {
    SpotResponse {
        id: s.id,
        name: s.name.clone(),
        status: s.status().into(),
        ticket_id: s.ticket_id(),
    }
}

pub(crate) fn ticket_to_response(t: &Ticket) -> TicketResponse {
    TicketResponse {
        id: t.id,
        spot_id: t.spot_id,
        ticket_type: t.ticket_type.into(),
        price: t.price,
    }
}
