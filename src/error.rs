//! Error taxonomy for Rootly.
//!
//! Every failure here is recoverable by the caller: a missing plant or species
//! renders as a placeholder, an invalid profile renders as "unrecognized".
//! An empty activity history is deliberately absent from this list; it is the
//! normal case and falls back to the plant's creation date.

use thiserror::Error;

/// Errors surfaced by the catalog, storage and care layers.
#[derive(Debug, Error)]
pub enum CareError {
    /// A plant or species referenced by the caller does not exist.
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    /// A species profile violates its invariants (zero interval, min > max, ...).
    #[error("invalid species profile: {0}")]
    InvalidProfile(String),

    /// A light level ordinal outside 1..=4.
    #[error("unrecognized light level: {0}")]
    UnrecognizedLightLevel(i64),

    /// Two catalog entries share the same scientific name.
    #[error("duplicate species: {0}")]
    DuplicateSpecies(String),

    /// The underlying database failed.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl CareError {
    pub fn plant_not_found(plant_id: i64) -> Self {
        CareError::NotFound {
            entity: "plant",
            key: plant_id.to_string(),
        }
    }

    pub fn user_not_found(user_id: i64) -> Self {
        CareError::NotFound {
            entity: "user",
            key: user_id.to_string(),
        }
    }

    pub fn species_not_found(scientific_name: &str) -> Self {
        CareError::NotFound {
            entity: "species",
            key: scientific_name.to_string(),
        }
    }

    /// True for failures that are the caller's fault rather than ours.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, CareError::Storage(_))
    }
}
