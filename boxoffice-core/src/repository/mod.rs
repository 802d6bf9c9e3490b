//! Persistence contract for events, spots and tickets.
//!
//! Two implementations ship with the crate: [`PgEventRepository`] over
//! PostgreSQL and [`InMemoryEventRepository`] for tests and local runs.

mod memory;
mod postgres;

pub use memory::InMemoryEventRepository;
pub use postgres::PgEventRepository;

use crate::entities::{Event, Spot, Ticket};
use crate::error::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Everything a successful purchase writes.
///
/// Each ticket's `spot_id` is moved from available to reserved and pointed
/// at the ticket. The commit is all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseCommit {
    pub tickets: Vec<Ticket>,
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create_event(&self, event: &Event) -> Result<()>;

    async fn create_spot(&self, spot: &Spot) -> Result<()>;

    /// Insert a batch of spots. Either all are stored or none is.
    async fn create_spots(&self, spots: &[Spot]) -> Result<()>;

    async fn create_ticket(&self, ticket: &Ticket) -> Result<()>;

    /// Persist the reservation of `spot` to `ticket_id`.
    ///
    /// Fails with `InvalidState` when the stored spot is already reserved.
    async fn reserve_spot(&self, spot_id: Uuid, ticket_id: Uuid) -> Result<()>;

    async fn list_events(&self) -> Result<Vec<Event>>;

    /// `NotFound` when no event has this id.
    async fn find_event_by_id(&self, event_id: Uuid) -> Result<Event>;

    /// Spots of an event in creation order. Empty when the event has none.
    async fn find_spots_by_event_id(&self, event_id: Uuid) -> Result<Vec<Spot>>;

    /// `NotFound` when the event has no spot with this name.
    async fn find_spot_by_name(&self, event_id: Uuid, name: &str) -> Result<Spot>;

    /// Store tickets and reserve their spots atomically.
    ///
    /// If any spot is no longer available nothing is written and the error is
    /// `InvalidState`.
    async fn commit_purchase(&self, commit: &PurchaseCommit) -> Result<()>;
}
