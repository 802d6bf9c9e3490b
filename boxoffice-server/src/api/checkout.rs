use axum::{Json, extract::State, response::IntoResponse};
use boxoffice_core::checkout::BuyTickets;
use boxoffice_sdk::objects::{BuyTicketsRequest, BuyTicketsResponse};

use super::{ApiError, ticket_to_response};
use crate::state::AppState;

/// `POST /checkout`: buy one ticket per requested spot.
///
/// The card hash and email are forwarded to the partner and not stored.
pub(super) async fn buy_tickets(
    state: State<AppState>,
    Json(payload): Json<BuyTicketsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tickets = state
        .box_office
        .buy_tickets(BuyTickets {
            event_id: payload.event_id,
            spots: payload.spots,
            ticket_type: payload.ticket_type,
            card_hash: payload.card_hash,
            email: payload.email,
        })
        .await?;

    Ok(Json(BuyTicketsResponse {
        tickets: tickets.iter().map(ticket_to_response).collect(),
    }))
}
