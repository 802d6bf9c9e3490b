pub mod checkout;
pub mod events;
pub mod spots;

pub use checkout::{BuyTicketsRequest, BuyTicketsResponse, TicketResponse, TicketType};
pub use events::{CreateEventRequest, EventResponse, ListEventsResponse, Rating};
pub use spots::{
    CreateSpotsRequest, CreateSpotsResponse, ListSpotsResponse, SpotResponse, SpotStatus,
};

use serde::{Deserialize, Serialize};

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
