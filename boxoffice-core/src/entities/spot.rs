use crate::entities::{Event, SpotStatus};
use crate::error::{Error, Result};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// A single sellable place within an event.
///
/// `ticket_id` is `Some` exactly when `status` is `Reserved`; the fields are
/// private so that only [`Spot::reserve`] can move between the two.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Spot {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    status: SpotStatus,
    ticket_id: Option<Uuid>,
}

impl Spot {
    /// Create an available spot named `name` for `event`.
    pub fn new(event: &Event, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::Validation("spot name is required".to_string()));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            event_id: event.id,
            name,
            status: SpotStatus::Available,
            ticket_id: None,
        })
    }

    pub fn status(&self) -> SpotStatus {
        self.status
    }

    pub fn ticket_id(&self) -> Option<Uuid> {
        self.ticket_id
    }

    pub fn is_available(&self) -> bool {
        self.status == SpotStatus::Available
    }

    /// Mark the spot as sold to `ticket_id`.
    ///
    /// A reserved spot stays reserved; a second call is an error even when it
    /// carries the same ticket.
    pub fn reserve(&mut self, ticket_id: Uuid) -> Result<()> {
        if self.status == SpotStatus::Reserved {
            return Err(Error::InvalidState(format!(
                "spot {} of event {} is already reserved",
                self.name, self.event_id
            )));
        }
        self.status = SpotStatus::Reserved;
        self.ticket_id = Some(ticket_id);
        Ok(())
    }
}

const SPOT_COLUMNS: &str = "id, event_id, name, status, ticket_id";

#[derive(Debug, Clone)]
/// Insert a batch of spots in a single statement.
///
/// Either every spot is stored or none is. Returns the number of rows inserted.
pub struct InsertManySpots {
    pub spots: Vec<Spot>,
}

impl Processor<InsertManySpots> for DatabaseProcessor {
    type Output = u64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertManySpots")]
    async fn process(&self, insert: InsertManySpots) -> Result<u64, sqlx::Error> {
        if insert.spots.is_empty() {
            return Ok(0);
        }

        let mut query_builder =
            sqlx::QueryBuilder::new("INSERT INTO spots (id, event_id, name, status, ticket_id) ");

        query_builder.push_values(insert.spots, |mut b, spot| {
            b.push_bind(spot.id)
                .push_bind(spot.event_id)
                .push_bind(spot.name)
                .push_bind(spot.status)
                .push_bind(spot.ticket_id);
        });

        let result = query_builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone)]
/// All spots of an event in creation order.
pub struct GetSpotsByEventId {
    pub event_id: Uuid,
}

impl Processor<GetSpotsByEventId> for DatabaseProcessor {
    type Output = Vec<Spot>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetSpotsByEventId")]
    async fn process(&self, query: GetSpotsByEventId) -> Result<Vec<Spot>, sqlx::Error> {
        let sql = format!("SELECT {SPOT_COLUMNS} FROM spots WHERE event_id = $1 ORDER BY seq ASC");
        let spots = sqlx::query_as::<_, Spot>(&sql)
            .bind(query.event_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(spots)
    }
}

#[derive(Debug, Clone)]
pub struct GetSpotByName {
    pub event_id: Uuid,
    pub name: String,
}

impl Processor<GetSpotByName> for DatabaseProcessor {
    type Output = Option<Spot>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetSpotByName")]
    async fn process(&self, query: GetSpotByName) -> Result<Option<Spot>, sqlx::Error> {
        let sql = format!("SELECT {SPOT_COLUMNS} FROM spots WHERE event_id = $1 AND name = $2");
        let spot = sqlx::query_as::<_, Spot>(&sql)
            .bind(query.event_id)
            .bind(query.name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(spot)
    }
}

#[derive(Debug, Clone)]
pub struct GetSpotById {
    pub spot_id: Uuid,
}

impl Processor<GetSpotById> for DatabaseProcessor {
    type Output = Option<Spot>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetSpotById")]
    async fn process(&self, query: GetSpotById) -> Result<Option<Spot>, sqlx::Error> {
        let sql = format!("SELECT {SPOT_COLUMNS} FROM spots WHERE id = $1");
        let spot = sqlx::query_as::<_, Spot>(&sql)
            .bind(query.spot_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(spot)
    }
}

impl Spot {
    /// Compare-and-set a spot from `available` to `reserved` within a transaction.
    ///
    /// Returns `false` when the spot was not available (or does not exist), in
    /// which case nothing was written.
    pub async fn reserve_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        spot_id: Uuid,
        ticket_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE spots
            SET status = 'reserved', ticket_id = $2
            WHERE id = $1 AND status = 'available'
            "#,
        )
        .bind(spot_id)
        .bind(ticket_id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::event::tests::sample_new_event;
    use proptest::prelude::*;

    fn sample_event() -> Event {
        Event::new(sample_new_event(1), time::OffsetDateTime::now_utc()).unwrap()
    }

    #[test]
    fn test_new_spot_is_available() {
        let event = sample_event();
        let spot = Spot::new(&event, "A1").unwrap();
        assert_eq!(spot.event_id, event.id);
        assert_eq!(spot.status(), SpotStatus::Available);
        assert_eq!(spot.ticket_id(), None);
    }

    #[test]
    fn test_new_spot_rejects_empty_name() {
        let event = sample_event();
        assert!(matches!(Spot::new(&event, ""), Err(Error::Validation(_))));
        assert!(matches!(Spot::new(&event, "  "), Err(Error::Validation(_))));
    }

    #[test]
    fn test_reserve_twice_fails() {
        let event = sample_event();
        let mut spot = Spot::new(&event, "A1").unwrap();
        let first = Uuid::new_v4();
        spot.reserve(first).unwrap();

        let err = spot.reserve(first).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
        let err = spot.reserve(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));

        // The failed attempts left the original reservation untouched.
        assert_eq!(spot.status(), SpotStatus::Reserved);
        assert_eq!(spot.ticket_id(), Some(first));
    }

    proptest! {
        #[test]
        fn test_reserved_iff_ticket_present(
            names in proptest::collection::vec("[A-Z][0-9]{1,2}", 1..20),
            attempts in proptest::collection::vec(any::<prop::sample::Index>(), 0..40),
        ) {
            let event = sample_event();
            let mut spots: Vec<Spot> = names
                .iter()
                .map(|n| Spot::new(&event, n.as_str()).unwrap())
                .collect();

            for index in attempts {
                let spot = &mut spots[index.index(names.len())];
                let was_available = spot.is_available();
                let outcome = spot.reserve(Uuid::new_v4());
                prop_assert_eq!(outcome.is_ok(), was_available);
            }

            for spot in &spots {
                prop_assert_eq!(
                    spot.status() == SpotStatus::Reserved,
                    spot.ticket_id().is_some()
                );
            }
        }
    }
}
