use crate::checkout::{BuyTickets, PurchaseOrchestrator};
use crate::entities::{Event, NewEvent, PriceTable, Spot, Ticket};
use crate::error::Result;
use crate::inventory::InventoryGenerator;
use crate::partners::PartnerFactory;
use crate::repository::EventRepository;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

/// The workflows exposed to the HTTP layer.
///
/// Dependencies are injected once at startup and shared by every request.
pub struct BoxOffice {
    repository: Arc<dyn EventRepository>,
    inventory: InventoryGenerator,
    checkout: PurchaseOrchestrator,
}

impl BoxOffice {
    pub fn new(
        repository: Arc<dyn EventRepository>,
        partners: Arc<dyn PartnerFactory>,
        prices: PriceTable,
        partner_timeout: Duration,
    ) -> Self {
        Self {
            inventory: InventoryGenerator::new(repository.clone()),
            checkout: PurchaseOrchestrator::new(repository.clone(), partners)
                .with_prices(prices)
                .with_partner_timeout(partner_timeout),
            repository,
        }
    }

    pub async fn list_events(&self) -> Result<Vec<Event>> {
        self.repository.list_events().await
    }

    pub async fn get_event(&self, event_id: Uuid) -> Result<Event> {
        self.repository.find_event_by_id(event_id).await
    }

    /// The event together with all of its spots.
    pub async fn list_spots(&self, event_id: Uuid) -> Result<(Event, Vec<Spot>)> {
        let event = self.repository.find_event_by_id(event_id).await?;
        let spots = self.repository.find_spots_by_event_id(event_id).await?;
        Ok((event, spots))
    }

    pub async fn create_spots(&self, event_id: Uuid, count: usize) -> Result<Vec<Spot>> {
        self.inventory.create_spots(event_id, count).await
    }

    pub async fn buy_tickets(&self, input: BuyTickets) -> Result<Vec<Ticket>> {
        self.checkout.buy_tickets(input).await
    }

    #[tracing::instrument(skip_all, err, fields(name = %new.name, partner_id = new.partner_id))]
    pub async fn create_event(&self, new: NewEvent) -> Result<Event> {
        let event = Event::new(new, OffsetDateTime::now_utc())?;
        self.repository.create_event(&event).await?;
        tracing::info!(event_id = %event.id, "event created");
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::event::tests::sample_new_event;
    use crate::error::Error;
    use crate::partners::{DEFAULT_PARTNER_TIMEOUT, PartnerKind, PartnerRoute, RoutingPartnerFactory};
    use crate::repository::InMemoryEventRepository;
    use httpmock::prelude::*;
    use serde_json::json;
    use url::Url;

    fn box_office(partner1_base: &str) -> BoxOffice {
        let partners = RoutingPartnerFactory::new(
            [PartnerRoute {
                id: 1,
                kind: PartnerKind::Partner1,
                base_url: Url::parse(partner1_base).unwrap(),
            }],
            DEFAULT_PARTNER_TIMEOUT,
        )
        .unwrap();
        BoxOffice::new(
            Arc::new(InMemoryEventRepository::new()),
            Arc::new(partners),
            PriceTable::default(),
            DEFAULT_PARTNER_TIMEOUT,
        )
    }

    #[tokio::test]
    async fn test_event_and_spot_workflows() {
        let office = box_office("http://localhost:9080/partner1");
        let event = office.create_event(sample_new_event(1)).await.unwrap();

        assert_eq!(office.get_event(event.id).await.unwrap(), event);
        assert_eq!(office.list_events().await.unwrap(), vec![event.clone()]);

        let created = office.create_spots(event.id, 3).await.unwrap();
        let (listed_event, spots) = office.list_spots(event.id).await.unwrap();
        assert_eq!(listed_event, event);
        assert_eq!(spots, created);

        let err = office.list_spots(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_event_validates() {
        let office = box_office("http://localhost:9080/partner1");
        let mut new = sample_new_event(1);
        new.name = String::new();
        let err = office.create_event(new).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(office.list_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_buy_through_http_partner() {
        let server = MockServer::start_async().await;
        let office = box_office(&server.url("/partner1"));
        let event = office.create_event(sample_new_event(1)).await.unwrap();
        office.create_spots(event.id, 2).await.unwrap();

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(format!("/partner1/events/{}/reserve", event.id));
                then.status(200).json_body(json!([
                    {"id": "r1", "email": "buyer@example.com", "spot": "A2",
                     "ticket_kind": "full", "status": "reserved",
                     "event_id": event.id.to_string()},
                ]));
            })
            .await;

        let tickets = office
            .buy_tickets(BuyTickets {
                event_id: event.id,
                spots: vec!["A2".to_string()],
                ticket_type: "full".to_string(),
                card_hash: "hash".to_string(),
                email: "buyer@example.com".to_string(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].price, event.price);

        let (_, spots) = office.list_spots(event.id).await.unwrap();
        assert!(spots[0].is_available());
        assert_eq!(spots[1].ticket_id(), Some(tickets[0].id));
    }
}
