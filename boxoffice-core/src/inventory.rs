//! Spot inventory generation.
//!
//! Spots are named row-major in rows of ten: index 0 is `A1`, index 9 is
//! `A10`, index 10 is `B1`. With 26 row letters an event holds at most
//! [`MAX_SPOTS_PER_EVENT`] spots.

use crate::entities::Spot;
use crate::error::{Error, Result};
use crate::repository::EventRepository;
use std::sync::Arc;
use uuid::Uuid;

const SPOTS_PER_ROW: usize = 10;
const ROWS: usize = 26;

pub const MAX_SPOTS_PER_EVENT: usize = SPOTS_PER_ROW * ROWS;

/// Name of the spot at position `index`, or `None` past the last row.
pub fn spot_name(index: usize) -> Option<String> {
    if index >= MAX_SPOTS_PER_EVENT {
        return None;
    }
    let row = char::from(b'A' + (index / SPOTS_PER_ROW) as u8);
    let number = index % SPOTS_PER_ROW + 1;
    Some(format!("{row}{number}"))
}

/// Creates available spots for events.
#[derive(Clone)]
pub struct InventoryGenerator {
    repository: Arc<dyn EventRepository>,
}

impl InventoryGenerator {
    pub fn new(repository: Arc<dyn EventRepository>) -> Self {
        Self { repository }
    }

    /// Create `count` new spots for the event.
    ///
    /// Numbering continues after the spots the event already has, so calling
    /// this twice with 5 yields A1..A5 and then A6..A10. The only bound is the
    /// naming range; `event.capacity` is informational.
    #[tracing::instrument(skip(self), err)]
    pub async fn create_spots(&self, event_id: Uuid, count: usize) -> Result<Vec<Spot>> {
        if count == 0 {
            return Err(Error::Validation(
                "number of spots must be greater than zero".to_string(),
            ));
        }

        let event = self.repository.find_event_by_id(event_id).await?;
        let existing = self.repository.find_spots_by_event_id(event_id).await?.len();
        let total = existing.saturating_add(count);

        if total > MAX_SPOTS_PER_EVENT {
            return Err(Error::Validation(format!(
                "an event holds at most {MAX_SPOTS_PER_EVENT} spots, requested {total}"
            )));
        }

        let spots = (existing..total)
            .map(|index| {
                let name = spot_name(index).ok_or_else(|| {
                    Error::Validation(format!("no spot name for position {index}"))
                })?;
                Spot::new(&event, name)
            })
            .collect::<Result<Vec<_>>>()?;

        self.repository.create_spots(&spots).await?;
        tracing::info!(created = spots.len(), "spots created");
        Ok(spots)
    }
}
