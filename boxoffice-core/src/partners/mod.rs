//! Partner integrations.
//!
//! Every event is sold through exactly one external partner that owns the
//! authoritative seat map. A partner is anything implementing [`Partner`];
//! [`RoutingPartnerFactory`] picks the implementation for a partner id from a
//! static routing table.
//!
//! - `Partner1`: English wire format (`/events/{id}/reserve`)
//! - `Partner2`: Portuguese wire format (`/eventos/{id}/reservar`)

mod partner1;
mod partner2;

pub use partner1::Partner1;
pub use partner2::Partner2;

use crate::entities::TicketType;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

/// Default bound on a single partner reservation call.
pub const DEFAULT_PARTNER_TIMEOUT: Duration = Duration::from_secs(10);

/// A reservation request as handed to a partner.
///
/// `card_hash` and `email` are opaque buyer tokens. They are passed through
/// and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub event_id: Uuid,
    pub spots: Vec<String>,
    pub ticket_type: TicketType,
    pub card_hash: String,
    pub email: String,
}

impl std::fmt::Debug for ReservationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationRequest")
            .field("event_id", &self.event_id)
            .field("spots", &self.spots)
            .field("ticket_type", &self.ticket_type)
            .field("card_hash", &"<redacted>")
            .field("email", &"<redacted>")
            .finish()
    }
}

/// A spot the partner confirmed as reserved for the buyer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantedSpot {
    pub spot: String,
}

/// Capability shared by all partner integrations.
#[async_trait]
pub trait Partner: Send + Sync {
    /// Ask the partner to reserve `request.spots`.
    ///
    /// Returns the spots the partner actually granted. Implementations do not
    /// check the count against the request; the caller does.
    async fn make_reservation(&self, request: &ReservationRequest) -> Result<Vec<GrantedSpot>>;

    /// The routing key this partner answers to.
    fn partner_id(&self) -> i32;
}

/// Resolves the partner integration responsible for an event.
pub trait PartnerFactory: Send + Sync {
    fn create_partner(&self, partner_id: i32) -> Result<Arc<dyn Partner>>;
}

/// Which wire format a routed partner speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartnerKind {
    Partner1,
    Partner2,
}

/// One entry of the partner routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerRoute {
    pub id: i32,
    pub kind: PartnerKind,
    pub base_url: Url,
}

/// [`PartnerFactory`] backed by a static routing table.
pub struct RoutingPartnerFactory {
    routes: HashMap<i32, PartnerRoute>,
    http_client: reqwest::Client,
}

impl RoutingPartnerFactory {
    /// Create a factory over `routes`. Every partner built by it shares one
    /// HTTP client whose requests are bounded by `timeout`.
    pub fn new(routes: impl IntoIterator<Item = PartnerRoute>, timeout: Duration) -> Result<Self> {
        let mut table = HashMap::new();
        for route in routes {
            if route.base_url.cannot_be_a_base() {
                return Err(Error::Validation(format!(
                    "partner {} base url {} cannot carry a path",
                    route.id, route.base_url
                )));
            }
            if table.insert(route.id, route.clone()).is_some() {
                return Err(Error::Validation(format!(
                    "duplicate routing entry for partner {}",
                    route.id
                )));
            }
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Validation(format!("partner http client: {e}")))?;

        Ok(Self {
            routes: table,
            http_client,
        })
    }

    pub fn route(&self, partner_id: i32) -> Option<&PartnerRoute> {
        self.routes.get(&partner_id)
    }
}

impl PartnerFactory for RoutingPartnerFactory {
    fn create_partner(&self, partner_id: i32) -> Result<Arc<dyn Partner>> {
        let route = self
            .routes
            .get(&partner_id)
            .ok_or(Error::UnknownPartner(partner_id))?;

        let partner: Arc<dyn Partner> = match route.kind {
            PartnerKind::Partner1 => Arc::new(Partner1::new(
                route.id,
                route.base_url.clone(),
                self.http_client.clone(),
            )),
            PartnerKind::Partner2 => Arc::new(Partner2::new(
                route.id,
                route.base_url.clone(),
                self.http_client.clone(),
            )),
        };
        Ok(partner)
    }
}

/// Append `segments` to the partner's base url.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| Error::PartnerProtocol(format!("base url {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// POST `body` as JSON and decode a JSON array of `R`.
///
/// Transport failures, timeouts and 5xx become `PartnerUnavailable`; 4xx
/// becomes `PartnerRejected`; anything we cannot decode is `PartnerProtocol`.
async fn post_reservation<B, R>(
    client: &reqwest::Client,
    url: Url,
    body: &B,
) -> Result<Vec<R>>
where
    B: serde::Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if status.is_server_error() {
        return Err(Error::PartnerUnavailable(format!(
            "partner responded with {status}"
        )));
    }
    if status.is_client_error() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::PartnerRejected(format!("{status}: {body}")));
    }
    if !status.is_success() {
        return Err(Error::PartnerProtocol(format!(
            "unexpected partner status {status}"
        )));
    }

    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::PartnerProtocol(format!("invalid reservation response: {e}")))
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_decode() {
        Error::PartnerProtocol(e.to_string())
    } else {
        Error::PartnerUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: i32, kind: PartnerKind) -> PartnerRoute {
        PartnerRoute {
            id,
            kind,
            base_url: Url::parse(&format!("http://localhost:9080/partner{id}")).unwrap(),
        }
    }

    #[test]
    fn test_factory_resolves_known_partners() {
        let factory = RoutingPartnerFactory::new(
            [route(1, PartnerKind::Partner1), route(2, PartnerKind::Partner2)],
            DEFAULT_PARTNER_TIMEOUT,
        )
        .unwrap();

        assert_eq!(factory.create_partner(1).unwrap().partner_id(), 1);
        assert_eq!(factory.create_partner(2).unwrap().partner_id(), 2);
    }

    #[test]
    fn test_factory_unknown_partner() {
        let factory =
            RoutingPartnerFactory::new([route(1, PartnerKind::Partner1)], DEFAULT_PARTNER_TIMEOUT)
                .unwrap();

        let err = factory.create_partner(3).err().unwrap();
        assert!(matches!(err, Error::UnknownPartner(3)));
    }

    #[test]
    fn test_factory_rejects_duplicate_routes() {
        let result = RoutingPartnerFactory::new(
            [route(1, PartnerKind::Partner1), route(1, PartnerKind::Partner2)],
            DEFAULT_PARTNER_TIMEOUT,
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_factory_partners_share_timeout_bound_client() {
        use httpmock::prelude::*;

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .delay(Duration::from_millis(500))
                    .body("[]");
            })
            .await;
        let factory = RoutingPartnerFactory::new(
            [PartnerRoute {
                id: 1,
                kind: PartnerKind::Partner1,
                base_url: Url::parse(&server.url("/partner1")).unwrap(),
            }],
            Duration::from_millis(50),
        )
        .unwrap();

        let request = ReservationRequest {
            event_id: Uuid::new_v4(),
            spots: vec!["A1".to_string()],
            ticket_type: TicketType::Full,
            card_hash: "hash".to_string(),
            email: "buyer@example.com".to_string(),
        };
        let err = factory
            .create_partner(1)
            .unwrap()
            .make_reservation(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PartnerUnavailable(_)));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("http://localhost:9080/partner1").unwrap();
        let url = endpoint(&base, &["events", "abc", "reserve"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9080/partner1/events/abc/reserve");

        let base = Url::parse("http://localhost:9080/").unwrap();
        let url = endpoint(&base, &["events", "abc", "reserve"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9080/events/abc/reserve");
    }

    #[test]
    fn test_request_debug_redacts_buyer_tokens() {
        let request = ReservationRequest {
            event_id: Uuid::nil(),
            spots: vec!["A1".to_string()],
            ticket_type: TicketType::Full,
            card_hash: "card-secret".to_string(),
            email: "buyer@example.com".to_string(),
        };
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("card-secret"));
        assert!(!rendered.contains("buyer@example.com"));
        assert!(rendered.contains("A1"));
    }
}
