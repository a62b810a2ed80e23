//! Error taxonomy shared by the geometry, query, resolution and service layers.

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed geometric input: out-of-range coordinates, non-positive
    /// radius, open or too-short polygon rings.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The geocoding provider failed, timed out, or returned no result.
    #[error("Address not found")]
    AddressNotFound,

    #[error("{entity} not found with id {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
