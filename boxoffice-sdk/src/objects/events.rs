//! Event request and response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Age rating of an event.
///
/// `L` is suitable for all ages; the numbered variants set a minimum age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    L,
    L10,
    L12,
    L14,
    L16,
    L18,
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Rating::L => "L",
            Rating::L10 => "L10",
            Rating::L12 => "L12",
            Rating::L14 => "L14",
            Rating::L16 => "L16",
            Rating::L18 => "L18",
        };
        f.write_str(s)
    }
}

/// Public view of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub organization: String,
    pub rating: Rating,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub image_url: String,
    pub capacity: i32,
    pub price: Decimal,
    pub partner_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEventsResponse {
    pub events: Vec<EventResponse>,
}

/// Request body for `POST /events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub location: String,
    pub organization: String,
    pub rating: Rating,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub image_url: String,
    pub capacity: i32,
    pub price: Decimal,
    pub partner_id: i32,
}
