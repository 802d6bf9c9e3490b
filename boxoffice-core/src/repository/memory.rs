use super::{EventRepository, PurchaseCommit};
use crate::entities::{Event, Spot, Ticket};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    events: HashMap<Uuid, Event>,
    /// Insertion order doubles as creation order.
    spots: Vec<Spot>,
    tickets: HashMap<Uuid, Ticket>,
}

impl State {
    fn spot_index(&self, spot_id: Uuid) -> Option<usize> {
        self.spots.iter().position(|s| s.id == spot_id)
    }

    fn check_new_spot(&self, spot: &Spot) -> Result<()> {
        if !self.events.contains_key(&spot.event_id) {
            return Err(Error::event_not_found(spot.event_id));
        }
        let clash = self
            .spots
            .iter()
            .any(|s| s.id == spot.id || (s.event_id == spot.event_id && s.name == spot.name));
        if clash {
            return Err(Error::InvalidState(format!(
                "spot {} already exists for event {}",
                spot.name, spot.event_id
            )));
        }
        Ok(())
    }
}

/// Process-local repository guarded by a single `RwLock`.
///
/// Every write takes the lock once, so multi-record writes are atomic with
/// respect to other callers.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    state: RwLock<State>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn ticket_count(&self) -> usize {
        self.state.read().await.tickets.len()
    }

    pub async fn find_ticket(&self, ticket_id: Uuid) -> Option<Ticket> {
        self.state.read().await.tickets.get(&ticket_id).cloned()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create_event(&self, event: &Event) -> Result<()> {
        let mut state = self.state.write().await;
        if state.events.contains_key(&event.id) {
            return Err(Error::InvalidState(format!("event {} already exists", event.id)));
        }
        state.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn create_spot(&self, spot: &Spot) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_new_spot(spot)?;
        state.spots.push(spot.clone());
        Ok(())
    }

    async fn create_spots(&self, spots: &[Spot]) -> Result<()> {
        let mut state = self.state.write().await;
        let mut names = HashSet::new();
        for spot in spots {
            state.check_new_spot(spot)?;
            if !names.insert((spot.event_id, spot.name.as_str())) {
                return Err(Error::InvalidState(format!(
                    "spot {} appears twice in batch",
                    spot.name
                )));
            }
        }
        state.spots.extend(spots.iter().cloned());
        Ok(())
    }

    async fn create_ticket(&self, ticket: &Ticket) -> Result<()> {
        let mut state = self.state.write().await;
        if state.spot_index(ticket.spot_id).is_none() {
            return Err(Error::NotFound {
                entity: "spot",
                key: ticket.spot_id.to_string(),
            });
        }
        if state.tickets.values().any(|t| t.spot_id == ticket.spot_id) {
            return Err(Error::InvalidState(format!(
                "spot {} already has a ticket",
                ticket.spot_id
            )));
        }
        state.tickets.insert(ticket.id, ticket.clone());
        Ok(())
    }

    async fn reserve_spot(&self, spot_id: Uuid, ticket_id: Uuid) -> Result<()> {
        let mut state = self.state.write().await;
        let index = state.spot_index(spot_id).ok_or_else(|| Error::NotFound {
            entity: "spot",
            key: spot_id.to_string(),
        })?;
        state.spots[index].reserve(ticket_id)
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let state = self.state.read().await;
        let mut events: Vec<Event> = state.events.values().cloned().collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        Ok(events)
    }

    async fn find_event_by_id(&self, event_id: Uuid) -> Result<Event> {
        let state = self.state.read().await;
        state
            .events
            .get(&event_id)
            .cloned()
            .ok_or_else(|| Error::event_not_found(event_id))
    }

    async fn find_spots_by_event_id(&self, event_id: Uuid) -> Result<Vec<Spot>> {
        let state = self.state.read().await;
        Ok(state
            .spots
            .iter()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn find_spot_by_name(&self, event_id: Uuid, name: &str) -> Result<Spot> {
        let state = self.state.read().await;
        state
            .spots
            .iter()
            .find(|s| s.event_id == event_id && s.name == name)
            .cloned()
            .ok_or_else(|| Error::spot_not_found(event_id, name))
    }

    async fn commit_purchase(&self, commit: &PurchaseCommit) -> Result<()> {
        let mut state = self.state.write().await;

        // Validate everything before touching state.
        let mut indices = Vec::with_capacity(commit.tickets.len());
        let mut seen = HashSet::new();
        for ticket in &commit.tickets {
            let index = state.spot_index(ticket.spot_id).ok_or_else(|| Error::NotFound {
                entity: "spot",
                key: ticket.spot_id.to_string(),
            })?;
            let spot = &state.spots[index];
            if !spot.is_available() || !seen.insert(ticket.spot_id) {
                return Err(Error::InvalidState(format!(
                    "spot {} of event {} is already reserved",
                    spot.name, spot.event_id
                )));
            }
            indices.push(index);
        }

        for (ticket, index) in commit.tickets.iter().zip(indices) {
            state.spots[index].reserve(ticket.id)?;
            state.tickets.insert(ticket.id, ticket.clone());
        }
        Ok(())
    }
}
