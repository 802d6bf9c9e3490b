//! Checkout request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ticket category. Determines the price multiplier applied to the event's
/// base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Full,
    Half,
}

impl TicketType {
    pub const ALL: [TicketType; 2] = [TicketType::Full, TicketType::Half];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::Full => "full",
            TicketType::Half => "half",
        }
    }
}

impl std::fmt::Display for TicketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for `POST /checkout`.
///
/// `ticket_type` stays a plain string here so an unknown category reaches the
/// domain validation instead of failing JSON decoding. `card_hash` and
/// `email` are opaque buyer tokens handed through to the partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyTicketsRequest {
    pub event_id: Uuid,
    pub spots: Vec<String>,
    pub ticket_type: String,
    pub card_hash: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketResponse {
    pub id: Uuid,
    pub spot_id: Uuid,
    pub ticket_type: TicketType,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyTicketsResponse {
    pub tickets: Vec<TicketResponse>,
}
