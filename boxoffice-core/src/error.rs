//! Error taxonomy shared by every workflow.
//!
//! Repository and partner failures travel up to the caller unchanged; the
//! HTTP boundary maps [`ErrorKind`] to a status class.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input to a domain constructor or workflow.
    #[error("validation error: {0}")]
    Validation(String),

    /// Event, spot or ticket absent.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Illegal state transition, e.g. reserving a spot twice.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// No routing entry for the partner identifier.
    #[error("unknown partner: {0}")]
    UnknownPartner(i32),

    /// Transport failure or timeout talking to the partner.
    #[error("partner unavailable: {0}")]
    PartnerUnavailable(String),

    /// The partner denied, or only partially granted, the reservation.
    #[error("partner rejected reservation: {0}")]
    PartnerRejected(String),

    /// The partner answered with something we cannot interpret.
    #[error("partner protocol error: {0}")]
    PartnerProtocol(String),

    /// Persistence failure.
    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidState,
    UnknownPartner,
    PartnerUnavailable,
    PartnerRejected,
    PartnerProtocol,
    Storage,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::InvalidState(_) => ErrorKind::InvalidState,
            Error::UnknownPartner(_) => ErrorKind::UnknownPartner,
            Error::PartnerUnavailable(_) => ErrorKind::PartnerUnavailable,
            Error::PartnerRejected(_) => ErrorKind::PartnerRejected,
            Error::PartnerProtocol(_) => ErrorKind::PartnerProtocol,
            Error::Storage(_) => ErrorKind::Storage,
        }
    }

    pub(crate) fn event_not_found(event_id: Uuid) -> Self {
        Error::NotFound {
            entity: "event",
            key: event_id.to_string(),
        }
    }

    pub(crate) fn spot_not_found(event_id: Uuid, name: &str) -> Self {
        Error::NotFound {
            entity: "spot",
            key: format!("{event_id}/{name}"),
        }
    }
}
