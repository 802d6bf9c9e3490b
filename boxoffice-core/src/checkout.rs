//! Ticket purchase workflow.
//!
//! A purchase asks the event's partner to reserve the requested spots and,
//! only when every spot was granted, records one ticket per spot locally.
//! Local writes for a purchase are committed in a single unit, so a failure
//! leaves neither tickets nor reserved spots behind.

use crate::entities::{PriceTable, Ticket, TicketType};
use crate::error::{Error, Result};
use crate::partners::{DEFAULT_PARTNER_TIMEOUT, PartnerFactory, ReservationRequest};
use crate::repository::{EventRepository, PurchaseCommit};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Input of [`PurchaseOrchestrator::buy_tickets`].
#[derive(Clone, PartialEq, Eq)]
pub struct BuyTickets {
    pub event_id: Uuid,
    /// Display names of the requested spots, e.g. `["A1", "A2"]`.
    pub spots: Vec<String>,
    pub ticket_type: String,
    pub card_hash: String,
    pub email: String,
}

impl std::fmt::Debug for BuyTickets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuyTickets")
            .field("event_id", &self.event_id)
            .field("spots", &self.spots)
            .field("ticket_type", &self.ticket_type)
            .finish_non_exhaustive()
    }
}

pub struct PurchaseOrchestrator {
    repository: Arc<dyn EventRepository>,
    partners: Arc<dyn PartnerFactory>,
    prices: PriceTable,
    partner_timeout: Duration,
}

impl PurchaseOrchestrator {
    pub fn new(repository: Arc<dyn EventRepository>, partners: Arc<dyn PartnerFactory>) -> Self {
        Self {
            repository,
            partners,
            prices: PriceTable::default(),
            partner_timeout: DEFAULT_PARTNER_TIMEOUT,
        }
    }

    pub fn with_prices(mut self, prices: PriceTable) -> Self {
        self.prices = prices;
        self
    }

    pub fn with_partner_timeout(mut self, timeout: Duration) -> Self {
        self.partner_timeout = timeout;
        self
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Buy one ticket for each requested spot.
    ///
    /// Nothing is sent to the partner unless the input is well-formed and the
    /// event exists. Any mismatch between the requested and granted spots
    /// fails the whole purchase.
    #[tracing::instrument(skip_all, err, fields(event_id = %input.event_id, spots = ?input.spots))]
    pub async fn buy_tickets(&self, input: BuyTickets) -> Result<Vec<Ticket>> {
        let ticket_type: TicketType = input.ticket_type.parse()?;
        check_requested_spots(&input.spots)?;

        let event = self.repository.find_event_by_id(input.event_id).await?;
        let partner = self.partners.create_partner(event.partner_id)?;

        let request = ReservationRequest {
            event_id: event.id,
            spots: input.spots,
            ticket_type,
            card_hash: input.card_hash,
            email: input.email,
        };

        let granted = tokio::time::timeout(self.partner_timeout, partner.make_reservation(&request))
            .await
            .map_err(|_| {
                Error::PartnerUnavailable(format!(
                    "partner {} did not answer within {:?}",
                    event.partner_id, self.partner_timeout
                ))
            })??;

        if granted.len() != request.spots.len() {
            return Err(Error::PartnerRejected(format!(
                "partner granted {} of {} requested spots",
                granted.len(),
                request.spots.len()
            )));
        }

        let requested: HashSet<&str> = request.spots.iter().map(String::as_str).collect();
        let mut seen = HashSet::with_capacity(granted.len());
        let mut tickets = Vec::with_capacity(granted.len());
        for grant in &granted {
            if !requested.contains(grant.spot.as_str()) || !seen.insert(grant.spot.as_str()) {
                return Err(Error::PartnerProtocol(format!(
                    "partner granted unexpected spot {:?}",
                    grant.spot
                )));
            }

            let spot = self
                .repository
                .find_spot_by_name(event.id, &grant.spot)
                .await
                .inspect_err(|_| {
                    tracing::error!(
                        spot = %grant.spot,
                        "partner granted a spot unknown locally"
                    );
                })?;
            if !spot.is_available() {
                return Err(Error::InvalidState(format!(
                    "spot {} of event {} is already reserved",
                    spot.name, event.id
                )));
            }
            tickets.push(Ticket::new(&event, &spot, ticket_type, &self.prices)?);
        }

        let commit = PurchaseCommit { tickets };
        if let Err(e) = self.repository.commit_purchase(&commit).await {
            tracing::error!(
                error = %e,
                partner_id = event.partner_id,
                "partner reservation confirmed but purchase was not recorded"
            );
            return Err(e);
        }

        tracing::info!(tickets = commit.tickets.len(), %ticket_type, "tickets purchased");
        Ok(commit.tickets)
    }
}

fn check_requested_spots(spots: &[String]) -> Result<()> {
    if spots.is_empty() {
        return Err(Error::Validation("at least one spot is required".to_string()));
    }
    let mut seen = HashSet::with_capacity(spots.len());
    for name in spots {
        if name.trim().is_empty() {
            return Err(Error::Validation("spot names must not be blank".to_string()));
        }
        if !seen.insert(name.as_str()) {
            return Err(Error::Validation(format!("spot {name} requested twice")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::event::tests::sample_new_event;
    use crate::entities::{Event, Spot, SpotStatus};
    use crate::partners::{GrantedSpot, Partner};
    use crate::repository::InMemoryEventRepository;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::OffsetDateTime;

    #[derive(Debug, Clone, Copy)]
    enum Script {
        GrantAll,
        GrantFirst(usize),
        Hang,
    }

    struct ScriptedPartner {
        calls: Arc<AtomicUsize>,
        script: Script,
    }

    #[async_trait]
    impl Partner for ScriptedPartner {
        async fn make_reservation(&self, request: &ReservationRequest) -> Result<Vec<GrantedSpot>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let grants = request
                .spots
                .iter()
                .map(|s| GrantedSpot { spot: s.clone() });
            match self.script {
                Script::GrantAll => Ok(grants.collect()),
                Script::GrantFirst(n) => Ok(grants.take(n).collect()),
                Script::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(Vec::new())
                }
            }
        }

        fn partner_id(&self) -> i32 {
            1
        }
    }

    /// Knows partner 1 only and counts reservation calls.
    struct ScriptedPartners {
        calls: Arc<AtomicUsize>,
        script: Script,
    }

    impl ScriptedPartners {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                calls: Arc::new(AtomicUsize::new(0)),
                script,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl PartnerFactory for ScriptedPartners {
        fn create_partner(&self, partner_id: i32) -> Result<Arc<dyn Partner>> {
            if partner_id != 1 {
                return Err(Error::UnknownPartner(partner_id));
            }
            Ok(Arc::new(ScriptedPartner {
                calls: self.calls.clone(),
                script: self.script,
            }))
        }
    }

    async fn seeded(partner_id: i32) -> (Arc<InMemoryEventRepository>, Event) {
        let repo = Arc::new(InMemoryEventRepository::new());
        let event = Event::new(sample_new_event(partner_id), OffsetDateTime::now_utc()).unwrap();
        repo.create_event(&event).await.unwrap();
        let spots: Vec<Spot> = ["A1", "A2", "A3"]
            .iter()
            .map(|n| Spot::new(&event, *n).unwrap())
            .collect();
        repo.create_spots(&spots).await.unwrap();
        (repo, event)
    }

    fn purchase(event_id: Uuid, spots: &[&str], ticket_type: &str) -> BuyTickets {
        BuyTickets {
            event_id,
            spots: spots.iter().map(|s| s.to_string()).collect(),
            ticket_type: ticket_type.to_string(),
            card_hash: "card-hash".to_string(),
            email: "buyer@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_full_grant_creates_tickets() {
        let (repo, event) = seeded(1).await;
        let partners = ScriptedPartners::new(Script::GrantAll);
        let orchestrator = PurchaseOrchestrator::new(repo.clone(), partners.clone());

        let tickets = orchestrator
            .buy_tickets(purchase(event.id, &["A1", "A2"], "half"))
            .await
            .unwrap();

        assert_eq!(tickets.len(), 2);
        assert_eq!(partners.calls(), 1);
        for (ticket, name) in tickets.iter().zip(["A1", "A2"]) {
            assert_eq!(ticket.ticket_type, TicketType::Half);
            assert_eq!(ticket.price, event.price * Decimal::new(5, 1));
            let spot = repo.find_spot_by_name(event.id, name).await.unwrap();
            assert_eq!(spot.id, ticket.spot_id);
            assert_eq!(spot.status(), SpotStatus::Reserved);
            assert_eq!(spot.ticket_id(), Some(ticket.id));
        }
        let a3 = repo.find_spot_by_name(event.id, "A3").await.unwrap();
        assert!(a3.is_available());
    }

    #[tokio::test]
    async fn test_partial_grant_is_rejected() {
        let (repo, event) = seeded(1).await;
        let partners = ScriptedPartners::new(Script::GrantFirst(1));
        let orchestrator = PurchaseOrchestrator::new(repo.clone(), partners.clone());

        let err = orchestrator
            .buy_tickets(purchase(event.id, &["A1", "A2"], "full"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PartnerRejected(_)));
        assert_eq!(repo.ticket_count().await, 0);
        let spots = repo.find_spots_by_event_id(event.id).await.unwrap();
        assert!(spots.iter().all(|s| s.is_available()));
    }

    #[tokio::test]
    async fn test_unknown_event_never_reaches_partner() {
        let (repo, _) = seeded(1).await;
        let partners = ScriptedPartners::new(Script::GrantAll);
        let orchestrator = PurchaseOrchestrator::new(repo, partners.clone());

        let err = orchestrator
            .buy_tickets(purchase(Uuid::new_v4(), &["A1"], "full"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound { entity: "event", .. }));
        assert_eq!(partners.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_partner() {
        let (repo, event) = seeded(42).await;
        let partners = ScriptedPartners::new(Script::GrantAll);
        let orchestrator = PurchaseOrchestrator::new(repo, partners.clone());

        let err = orchestrator
            .buy_tickets(purchase(event.id, &["A1"], "full"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnknownPartner(42)));
        assert_eq!(partners.calls(), 0);
    }

    #[tokio::test]
    async fn test_bad_input_is_rejected_before_partner_call() {
        let (repo, event) = seeded(1).await;
        let partners = ScriptedPartners::new(Script::GrantAll);
        let orchestrator = PurchaseOrchestrator::new(repo, partners.clone());

        for input in [
            purchase(event.id, &["A1"], "vip"),
            purchase(event.id, &[], "full"),
            purchase(event.id, &["A1", "A1"], "full"),
            purchase(event.id, &[" "], "full"),
        ] {
            let err = orchestrator.buy_tickets(input).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{err:?}");
        }
        assert_eq!(partners.calls(), 0);
    }

    #[tokio::test]
    async fn test_granted_spot_unknown_locally() {
        let (repo, event) = seeded(1).await;
        let partners = ScriptedPartners::new(Script::GrantAll);
        let orchestrator = PurchaseOrchestrator::new(repo.clone(), partners);

        let err = orchestrator
            .buy_tickets(purchase(event.id, &["A1", "Z9"], "full"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound { entity: "spot", .. }));
        assert_eq!(repo.ticket_count().await, 0);
        assert!(repo.find_spot_by_name(event.id, "A1").await.unwrap().is_available());
    }

    #[tokio::test]
    async fn test_already_reserved_spot() {
        let (repo, event) = seeded(1).await;
        let partners = ScriptedPartners::new(Script::GrantAll);
        let orchestrator = PurchaseOrchestrator::new(repo.clone(), partners);

        orchestrator
            .buy_tickets(purchase(event.id, &["A1"], "full"))
            .await
            .unwrap();
        let err = orchestrator
            .buy_tickets(purchase(event.id, &["A2", "A1"], "full"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidState(_)));
        assert_eq!(repo.ticket_count().await, 1);
        assert!(repo.find_spot_by_name(event.id, "A2").await.unwrap().is_available());
    }

    #[tokio::test]
    async fn test_partner_timeout_is_unavailable() {
        let (repo, event) = seeded(1).await;
        let partners = ScriptedPartners::new(Script::Hang);
        let orchestrator = PurchaseOrchestrator::new(repo.clone(), partners.clone())
            .with_partner_timeout(Duration::from_millis(50));

        let err = orchestrator
            .buy_tickets(purchase(event.id, &["A1"], "full"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PartnerUnavailable(_)));
        assert_eq!(partners.calls(), 1);
        assert_eq!(repo.ticket_count().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_purchases_of_same_spot() {
        let (repo, event) = seeded(1).await;
        let partners = ScriptedPartners::new(Script::GrantAll);
        let orchestrator = Arc::new(PurchaseOrchestrator::new(repo.clone(), partners));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let orchestrator = orchestrator.clone();
                let input = purchase(event.id, &["A1"], "full");
                tokio::spawn(async move { orchestrator.buy_tickets(input).await })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(tickets) => {
                    assert_eq!(tickets.len(), 1);
                    succeeded += 1;
                }
                Err(e) => assert!(matches!(e, Error::InvalidState(_)), "{e:?}"),
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(repo.ticket_count().await, 1);
    }
}
