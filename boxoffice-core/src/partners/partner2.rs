use super::{GrantedSpot, Partner, ReservationRequest, endpoint, post_reservation};
use crate::entities::TicketType;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Partner speaking the Portuguese reservation protocol.
///
/// `POST {base}/eventos/{event_id}/reservar`, with `inteira` for full price
/// and `meia` for half price.
#[derive(Debug, Clone)]
pub struct Partner2 {
    id: i32,
    base_url: Url,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ReservarBody<'a> {
    lugares: &'a [String],
    tipo_ingresso: &'static str,
    email: &'a str,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ReservaEntry {
    id: String,
    email: String,
    lugar: String,
    tipo_ingresso: String,
    #[serde(default)]
    estado: Option<String>,
    evento_id: String,
}

impl Partner2 {
    pub fn new(id: i32, base_url: Url, client: reqwest::Client) -> Self {
        Self {
            id,
            base_url,
            client,
        }
    }

    fn tipo_ingresso(ticket_type: TicketType) -> &'static str {
        match ticket_type {
            TicketType::Full => "inteira",
            TicketType::Half => "meia",
        }
    }

    fn url(&self, event_id: Uuid) -> Result<Url> {
        endpoint(&self.base_url, &["eventos", &event_id.to_string(), "reservar"])
    }
}

#[async_trait]
impl Partner for Partner2 {
    #[tracing::instrument(skip_all, fields(partner_id = self.id, event_id = %request.event_id))]
    async fn make_reservation(&self, request: &ReservationRequest) -> Result<Vec<GrantedSpot>> {
        let body = ReservarBody {
            lugares: &request.spots,
            tipo_ingresso: Self::tipo_ingresso(request.ticket_type),
            email: &request.email,
        };
        let entries: Vec<ReservaEntry> =
            post_reservation(&self.client, self.url(request.event_id)?, &body).await?;

        let granted: Vec<GrantedSpot> = entries
            .into_iter()
            .filter(|e| e.estado.as_deref().is_none_or(|s| s == "reservado"))
            .map(|e| GrantedSpot { spot: e.lugar })
            .collect();
        tracing::debug!(granted = granted.len(), "partner2 reservation answered");
        Ok(granted)
    }

    fn partner_id(&self) -> i32 {
        self.id
    }
}
