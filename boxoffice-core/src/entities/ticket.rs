use crate::entities::{Event, Spot, TicketType};
use crate::error::{Error, Result};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Local record of a partner-confirmed reservation.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub spot_id: Uuid,
    pub ticket_type: TicketType,
    pub price: Decimal,
}

/// Multiplier applied to an event's base price for each ticket category.
///
/// Defaults: `full` = 1.0, `half` = 0.5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTable {
    multipliers: BTreeMap<TicketType, Decimal>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            multipliers: BTreeMap::from([
                (TicketType::Full, Decimal::ONE),
                (TicketType::Half, Decimal::new(5, 1)),
            ]),
        }
    }
}

impl PriceTable {
    /// Build a table from explicit multipliers. Negative multipliers are rejected.
    pub fn new(multipliers: impl IntoIterator<Item = (TicketType, Decimal)>) -> Result<Self> {
        let multipliers: BTreeMap<_, _> = multipliers.into_iter().collect();
        if let Some((ticket_type, m)) = multipliers.iter().find(|(_, m)| m.is_sign_negative()) {
            return Err(Error::Validation(format!(
                "price multiplier for {ticket_type} must not be negative, got {m}"
            )));
        }
        Ok(Self { multipliers })
    }

    pub fn multiplier(&self, ticket_type: TicketType) -> Option<Decimal> {
        self.multipliers.get(&ticket_type).copied()
    }

    /// Price of one ticket of `ticket_type` for an event whose base price is `base`.
    ///
    /// Rounded to cents, half away from zero, the same way a `NUMERIC(12,2)`
    /// column stores it.
    pub fn price(&self, base: Decimal, ticket_type: TicketType) -> Result<Decimal> {
        let multiplier = self.multiplier(ticket_type).ok_or_else(|| {
            Error::Validation(format!("ticket type {ticket_type} is not sold"))
        })?;
        Ok((base * multiplier).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl Ticket {
    /// Build the ticket for `spot`, pricing it from the event's base price.
    ///
    /// Fails when the spot belongs to another event or the category has no
    /// price multiplier.
    pub fn new(
        event: &Event,
        spot: &Spot,
        ticket_type: TicketType,
        prices: &PriceTable,
    ) -> Result<Self> {
        if spot.event_id != event.id {
            return Err(Error::Validation(format!(
                "spot {} belongs to event {}, not {}",
                spot.name, spot.event_id, event.id
            )));
        }
        let price = prices.price(event.price, ticket_type)?;
        Ok(Self {
            id: Uuid::new_v4(),
            event_id: event.id,
            spot_id: spot.id,
            ticket_type,
            price,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateTicketRecord {
    pub ticket: Ticket,
}

impl Processor<CreateTicketRecord> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CreateTicketRecord")]
    async fn process(&self, insert: CreateTicketRecord) -> Result<(), sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        Ticket::insert_with(&mut conn, &insert.ticket).await
    }
}

impl Ticket {
    async fn insert_with(
        conn: &mut sqlx::PgConnection,
        ticket: &Ticket,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO tickets (id, event_id, spot_id, ticket_type, price)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(ticket.id)
        .bind(ticket.event_id)
        .bind(ticket.spot_id)
        .bind(ticket.ticket_type)
        .bind(ticket.price)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Insert a ticket within a transaction.
    pub async fn insert_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        ticket: &Ticket,
    ) -> Result<(), sqlx::Error> {
        Self::insert_with(&mut **tx, ticket).await
    }
}
