use super::{EventRepository, PurchaseCommit};
use crate::entities::event::{CreateEventRecord, GetEventById, ListEventRecords};
use crate::entities::spot::{GetSpotById, GetSpotByName, GetSpotsByEventId, InsertManySpots};
use crate::entities::ticket::CreateTicketRecord;
use crate::entities::{Event, Spot, Ticket};
use crate::error::{Error, Result};
use crate::framework::DatabaseProcessor;
use async_trait::async_trait;
use kanau::processor::Processor;
use uuid::Uuid;

/// [`EventRepository`] backed by PostgreSQL.
///
/// Single-statement reads and writes go through the `DatabaseProcessor`
/// queries; multi-statement writes run in one transaction.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    db: DatabaseProcessor,
}

impl PgEventRepository {
    pub fn new(db: DatabaseProcessor) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.db.pool
    }
}

/// Translate constraint violations into domain errors.
fn write_error(e: sqlx::Error, what: &str) -> Error {
    match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            Error::InvalidState(format!("{what} already exists"))
        }
        Some(db) if db.is_foreign_key_violation() => Error::NotFound {
            entity: "parent record",
            key: what.to_string(),
        },
        _ => Error::Storage(e),
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn create_event(&self, event: &Event) -> Result<()> {
        self.db
            .process(CreateEventRecord {
                event: event.clone(),
            })
            .await
            .map_err(|e| write_error(e, &format!("event {}", event.id)))
    }

    async fn create_spot(&self, spot: &Spot) -> Result<()> {
        self.create_spots(std::slice::from_ref(spot)).await
    }

    async fn create_spots(&self, spots: &[Spot]) -> Result<()> {
        let inserted = self
            .db
            .process(InsertManySpots {
                spots: spots.to_vec(),
            })
            .await
            .map_err(|e| write_error(e, "spot"))?;
        tracing::debug!(inserted, "spots stored");
        Ok(())
    }

    async fn create_ticket(&self, ticket: &Ticket) -> Result<()> {
        self.db
            .process(CreateTicketRecord {
                ticket: ticket.clone(),
            })
            .await
            .map_err(|e| write_error(e, &format!("ticket for spot {}", ticket.spot_id)))
    }

    async fn reserve_spot(&self, spot_id: Uuid, ticket_id: Uuid) -> Result<()> {
        let mut tx = self.db.begin().await?;
        if Spot::reserve_tx(&mut tx, spot_id, ticket_id).await? {
            // spots.ticket_id is checked at commit time.
            tx.commit()
                .await
                .map_err(|e| write_error(e, &format!("ticket {ticket_id}")))?;
            return Ok(());
        }
        drop(tx);

        match self.db.process(GetSpotById { spot_id }).await? {
            Some(spot) => Err(Error::InvalidState(format!(
                "spot {} of event {} is already reserved",
                spot.name, spot.event_id
            ))),
            None => Err(Error::NotFound {
                entity: "spot",
                key: spot_id.to_string(),
            }),
        }
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        Ok(self.db.process(ListEventRecords).await?)
    }

    async fn find_event_by_id(&self, event_id: Uuid) -> Result<Event> {
        self.db
            .process(GetEventById { event_id })
            .await?
            .ok_or_else(|| Error::event_not_found(event_id))
    }

    async fn find_spots_by_event_id(&self, event_id: Uuid) -> Result<Vec<Spot>> {
        Ok(self.db.process(GetSpotsByEventId { event_id }).await?)
    }

    async fn find_spot_by_name(&self, event_id: Uuid, name: &str) -> Result<Spot> {
        self.db
            .process(GetSpotByName {
                event_id,
                name: name.to_string(),
            })
            .await?
            .ok_or_else(|| Error::spot_not_found(event_id, name))
    }

    #[tracing::instrument(skip_all, err, fields(tickets = commit.tickets.len()))]
    async fn commit_purchase(&self, commit: &PurchaseCommit) -> Result<()> {
        let mut tx = self.db.begin().await?;

        for ticket in &commit.tickets {
            // Reserve first so a lost race never leaves an orphan ticket row.
            if !Spot::reserve_tx(&mut tx, ticket.spot_id, ticket.id).await? {
                return Err(Error::InvalidState(format!(
                    "spot {} is no longer available",
                    ticket.spot_id
                )));
            }
            Ticket::insert_tx(&mut tx, ticket)
                .await
                .map_err(|e| write_error(e, &format!("ticket for spot {}", ticket.spot_id)))?;
        }

        tx.commit().await.map_err(|e| write_error(e, "ticket"))?;
        Ok(())
    }
}
