use super::{GrantedSpot, Partner, ReservationRequest, endpoint, post_reservation};
use crate::entities::TicketType;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Partner speaking the English reservation protocol.
///
/// `POST {base}/events/{event_id}/reserve`
#[derive(Debug, Clone)]
pub struct Partner1 {
    id: i32,
    base_url: Url,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ReserveBody<'a> {
    spots: &'a [String],
    ticket_kind: &'static str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ReserveEntry {
    id: String,
    email: String,
    spot: String,
    ticket_kind: String,
    #[serde(default)]
    status: Option<String>,
    event_id: String,
}

impl Partner1 {
    pub fn new(id: i32, base_url: Url, client: reqwest::Client) -> Self {
        Self {
            id,
            base_url,
            client,
        }
    }

    fn ticket_kind(ticket_type: TicketType) -> &'static str {
        match ticket_type {
            TicketType::Full => "full",
            TicketType::Half => "half",
        }
    }

    fn url(&self, event_id: Uuid) -> Result<Url> {
        endpoint(&self.base_url, &["events", &event_id.to_string(), "reserve"])
    }
}

#[async_trait]
impl Partner for Partner1 {
    #[tracing::instrument(skip_all, fields(partner_id = self.id, event_id = %request.event_id))]
    async fn make_reservation(&self, request: &ReservationRequest) -> Result<Vec<GrantedSpot>> {
        let body = ReserveBody {
            spots: &request.spots,
            ticket_kind: Self::ticket_kind(request.ticket_type),
            email: &request.email,
        };
        let entries: Vec<ReserveEntry> =
            post_reservation(&self.client, self.url(request.event_id)?, &body).await?;

        let granted: Vec<GrantedSpot> = entries
            .into_iter()
            .filter(|e| e.status.as_deref().is_none_or(|s| s == "reserved"))
            .map(|e| GrantedSpot { spot: e.spot })
            .collect();
        tracing::debug!(granted = granted.len(), "partner1 reservation answered");
        Ok(granted)
    }

    fn partner_id(&self) -> i32 {
        self.id
    }
}
