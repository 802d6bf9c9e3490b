use crate::entities::Rating;
use crate::error::{Error, Result};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

/// A ticketed event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub organization: String,
    pub rating: Rating,
    pub date: OffsetDateTime,
    pub image_url: String,
    pub capacity: i32,
    pub price: Decimal,
    /// Routing key of the partner integration that sells this event.
    pub partner_id: i32,
}

/// Fields required to create an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub location: String,
    pub organization: String,
    pub rating: Rating,
    pub date: OffsetDateTime,
    pub image_url: String,
    pub capacity: i32,
    pub price: Decimal,
    pub partner_id: i32,
}

impl Event {
    /// Validate `new` and assign a fresh identity.
    ///
    /// `now` is passed in so the "must be in the future" rule is testable.
    pub fn new(new: NewEvent, now: OffsetDateTime) -> Result<Self> {
        if new.name.trim().is_empty() {
            return Err(Error::Validation("event name is required".to_string()));
        }
        if new.date <= now {
            return Err(Error::Validation("event date must be in the future".to_string()));
        }
        if new.capacity <= 0 {
            return Err(Error::Validation(
                "event capacity must be greater than zero".to_string(),
            ));
        }
        if new.price <= Decimal::ZERO {
            return Err(Error::Validation(
                "event price must be greater than zero".to_string(),
            ));
        }
        if new.price.normalize().scale() > 2 {
            return Err(Error::Validation(format!(
                "event price {} has more than two decimal places",
                new.price
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: new.name,
            location: new.location,
            organization: new.organization,
            rating: new.rating,
            date: new.date,
            image_url: new.image_url,
            capacity: new.capacity,
            price: new.price,
            partner_id: new.partner_id,
        })
    }
}

const EVENT_COLUMNS: &str =
    "id, name, location, organization, rating, date, image_url, capacity, price, partner_id";

#[derive(Debug, Clone)]
/// Insert a fully constructed event.
pub struct CreateEventRecord {
    pub event: Event,
}

impl Processor<CreateEventRecord> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CreateEventRecord")]
    async fn process(&self, insert: CreateEventRecord) -> Result<(), sqlx::Error> {
        let event = insert.event;
        sqlx::query(
            r#"
            INSERT INTO events
            (id, name, location, organization, rating, date, image_url, capacity, price, partner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(event.id)
        .bind(event.name)
        .bind(event.location)
        .bind(event.organization)
        .bind(event.rating)
        .bind(event.date)
        .bind(event.image_url)
        .bind(event.capacity)
        .bind(event.price)
        .bind(event.partner_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct GetEventById {
    pub event_id: Uuid,
}

impl Processor<GetEventById> for DatabaseProcessor {
    type Output = Option<Event>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetEventById")]
    async fn process(&self, query: GetEventById) -> Result<Option<Event>, sqlx::Error> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(query.event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }
}

#[derive(Debug, Clone)]
/// List all events, soonest first.
pub struct ListEventRecords;

impl Processor<ListEventRecords> for DatabaseProcessor {
    type Output = Vec<Event>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListEventRecords")]
    async fn process(&self, _query: ListEventRecords) -> Result<Vec<Event>, sqlx::Error> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY date ASC, name ASC");
        let events = sqlx::query_as::<_, Event>(&sql).fetch_all(&self.pool).await?;
        Ok(events)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_new_event(partner_id: i32) -> NewEvent {
        NewEvent {
            name: "Rock in the Park".to_string(),
            location: "Central Park".to_string(),
            organization: "Park Concerts".to_string(),
            rating: Rating::L12,
            date: OffsetDateTime::now_utc() + time::Duration::days(30),
            image_url: "https://images.example.com/rock.png".to_string(),
            capacity: 100,
            price: Decimal::new(10000, 2),
            partner_id,
        }
    }

    #[test]
    fn test_new_event_assigns_identity() {
        let a = Event::new(sample_new_event(1), OffsetDateTime::now_utc()).unwrap();
        let b = Event::new(sample_new_event(1), OffsetDateTime::now_utc()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.partner_id, 1);
    }

    #[test]
    fn test_new_event_validation() {
        let now = OffsetDateTime::now_utc();

        let mut blank = sample_new_event(1);
        blank.name = "   ".to_string();
        assert!(matches!(Event::new(blank, now), Err(Error::Validation(_))));

        let mut past = sample_new_event(1);
        past.date = now - time::Duration::hours(1);
        assert!(matches!(Event::new(past, now), Err(Error::Validation(_))));

        let mut empty = sample_new_event(1);
        empty.capacity = 0;
        assert!(matches!(Event::new(empty, now), Err(Error::Validation(_))));

        let mut free = sample_new_event(1);
        free.price = Decimal::ZERO;
        assert!(matches!(Event::new(free, now), Err(Error::Validation(_))));

        let mut fractional = sample_new_event(1);
        fractional.price = Decimal::new(10005, 3);
        assert!(matches!(Event::new(fractional, now), Err(Error::Validation(_))));

        // Trailing zeros are not extra precision.
        let mut padded = sample_new_event(1);
        padded.price = Decimal::new(100500, 4);
        assert!(Event::new(padded, now).is_ok());
    }
}
