pub mod event;
pub mod spot;
pub mod ticket;

pub use event::{Event, NewEvent};
pub use spot::Spot;
pub use ticket::{PriceTable, Ticket};

use crate::error::Error;
use boxoffice_sdk::objects::{
    Rating as SdkRating, SpotStatus as SdkSpotStatus, TicketType as SdkTicketType,
};

/// Event age rating for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `boxoffice_sdk::objects::Rating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "event_rating")]
pub enum Rating {
    L,
    L10,
    L12,
    L14,
    L16,
    L18,
}

impl From<Rating> for SdkRating {
    fn from(value: Rating) -> Self {
        match value {
            Rating::L => SdkRating::L,
            Rating::L10 => SdkRating::L10,
            Rating::L12 => SdkRating::L12,
            Rating::L14 => SdkRating::L14,
            Rating::L16 => SdkRating::L16,
            Rating::L18 => SdkRating::L18,
        }
    }
}

impl From<SdkRating> for Rating {
    fn from(value: SdkRating) -> Self {
        match value {
            SdkRating::L => Rating::L,
            SdkRating::L10 => Rating::L10,
            SdkRating::L12 => Rating::L12,
            SdkRating::L14 => Rating::L14,
            SdkRating::L16 => Rating::L16,
            SdkRating::L18 => Rating::L18,
        }
    }
}

/// Spot status for database operations.
///
/// `Available -> Reserved` is the only transition; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "spot_status")]
pub enum SpotStatus {
    Available,
    Reserved,
}

impl From<SpotStatus> for SdkSpotStatus {
    fn from(value: SpotStatus) -> Self {
        match value {
            SpotStatus::Available => SdkSpotStatus::Available,
            SpotStatus::Reserved => SdkSpotStatus::Reserved,
        }
    }
}

impl From<SdkSpotStatus> for SpotStatus {
    fn from(value: SdkSpotStatus) -> Self {
        match value {
            SdkSpotStatus::Available => SpotStatus::Available,
            SdkSpotStatus::Reserved => SpotStatus::Reserved,
        }
    }
}

/// Ticket category for database operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "ticket_type")]
pub enum TicketType {
    Full,
    Half,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::Full => "full",
            TicketType::Half => "half",
        }
    }
}

impl std::fmt::Display for TicketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TicketType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(TicketType::Full),
            "half" => Ok(TicketType::Half),
            other => Err(Error::Validation(format!("unknown ticket type: {other:?}"))),
        }
    }
}

impl From<TicketType> for SdkTicketType {
    fn from(value: TicketType) -> Self {
        match value {
            TicketType::Full => SdkTicketType::Full,
            TicketType::Half => SdkTicketType::Half,
        }
    }
}

impl From<SdkTicketType> for TicketType {
    fn from(value: SdkTicketType) -> Self {
        match value {
            SdkTicketType::Full => TicketType::Full,
            SdkTicketType::Half => TicketType::Half,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_type_parsing() {
        assert_eq!("full".parse::<TicketType>().unwrap(), TicketType::Full);
        assert_eq!("half".parse::<TicketType>().unwrap(), TicketType::Half);

        let err = "vip".parse::<TicketType>().unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        // Categories are case-sensitive on the wire.
        assert!("FULL".parse::<TicketType>().is_err());
    }
}
