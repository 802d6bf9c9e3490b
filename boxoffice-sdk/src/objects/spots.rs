//! Spot request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::EventResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Available,
    Reserved,
}

impl std::fmt::Display for SpotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpotStatus::Available => write!(f, "available"),
            SpotStatus::Reserved => write!(f, "reserved"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotResponse {
    pub id: Uuid,
    pub name: String,
    pub status: SpotStatus,
    pub ticket_id: Option<Uuid>,
}

/// Request body for `POST /events/{event_id}/spots`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSpotsRequest {
    pub number_of_spots: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSpotsResponse {
    pub spots: Vec<SpotResponse>,
}

/// An event together with its full spot map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSpotsResponse {
    pub event: EventResponse,
    pub spots: Vec<SpotResponse>,
}
