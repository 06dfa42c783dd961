//! The species catalog.
//!
//! Read-only reference data keyed by scientific name. It is built once at
//! startup and shared behind an `Arc`; lookups take `&self` and never lock.
//!
//! Species whose stored profile failed validation are kept apart as
//! [`RejectedProfile`]s: they never yield an interval, but their conditions are
//! still reported, with the light level marked unrecognized where it is.

use std::collections::BTreeMap;

use crate::error::CareError;
use crate::model::{IdealConditions, LightDescriptor, SpeciesProfile, describe_light_level};

/// A stored species entry that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedProfile {
    pub scientific_name: String,
    pub light: LightDescriptor,
    pub min_temperature: f32,
    pub max_temperature: f32,
    pub reason: String,
}

impl RejectedProfile {
    pub fn new(
        scientific_name: impl Into<String>,
        light_ordinal: i64,
        min_temperature: f32,
        max_temperature: f32,
        error: &CareError,
    ) -> Self {
        Self {
            scientific_name: scientific_name.into(),
            light: describe_light_level(light_ordinal),
            min_temperature,
            max_temperature,
            reason: error.to_string(),
        }
    }

    pub fn ideal_conditions(&self) -> IdealConditions {
        IdealConditions {
            light: self.light,
            min_temperature: self.min_temperature,
            max_temperature: self.max_temperature,
            issue: Some(self.reason.clone()),
        }
    }
}

/// Immutable map from scientific name to care profile.
#[derive(Debug, Clone, Default)]
pub struct SpeciesCatalog {
    profiles: BTreeMap<String, SpeciesProfile>,
    rejected: BTreeMap<String, RejectedProfile>,
}

impl SpeciesCatalog {
    /// Build a catalog from already-validated profiles.
    ///
    /// # Errors
    ///
    /// `DuplicateSpecies` if two profiles share a scientific name.
    pub fn from_profiles(
        profiles: impl IntoIterator<Item = SpeciesProfile>,
    ) -> Result<Self, CareError> {
        Self::from_parts(profiles, [])
    }

    /// Build a catalog from valid profiles plus entries that failed validation.
    ///
    /// # Errors
    ///
    /// `DuplicateSpecies` if a scientific name appears twice across both lists.
    pub fn from_parts(
        profiles: impl IntoIterator<Item = SpeciesProfile>,
        rejected: impl IntoIterator<Item = RejectedProfile>,
    ) -> Result<Self, CareError> {
        let mut catalog = Self::default();
        for profile in profiles {
            let name = profile.scientific_name().to_string();
            if catalog.profiles.contains_key(&name) {
                return Err(CareError::DuplicateSpecies(name));
            }
            catalog.profiles.insert(name, profile);
        }
        for entry in rejected {
            let name = entry.scientific_name.clone();
            if catalog.contains(&name) {
                return Err(CareError::DuplicateSpecies(name));
            }
            catalog.rejected.insert(name, entry);
        }
        Ok(catalog)
    }

    /// Look up a species. Unknown names yield `None`.
    pub fn lookup(&self, scientific_name: &str) -> Option<&SpeciesProfile> {
        self.profiles.get(scientific_name)
    }

    /// Like [`lookup`](Self::lookup), but reports a missing species as
    /// `NotFound` and a rejected one as `InvalidProfile`.
    pub fn require(&self, scientific_name: &str) -> Result<&SpeciesProfile, CareError> {
        if let Some(entry) = self.rejected.get(scientific_name) {
            return Err(CareError::InvalidProfile(entry.reason.clone()));
        }
        self.lookup(scientific_name)
            .ok_or_else(|| CareError::species_not_found(scientific_name))
    }

    /// Ideal light and temperature for a species, or `None` if unknown.
    ///
    /// Rejected species still report their conditions, with `issue` set.
    pub fn ideal_conditions(&self, scientific_name: &str) -> Option<IdealConditions> {
        self.lookup(scientific_name)
            .map(SpeciesProfile::ideal_conditions)
            .or_else(|| {
                self.rejected
                    .get(scientific_name)
                    .map(RejectedProfile::ideal_conditions)
            })
    }

    /// True if the name is in the catalog, valid or not.
    pub fn contains(&self, scientific_name: &str) -> bool {
        self.profiles.contains_key(scientific_name) || self.rejected.contains_key(scientific_name)
    }

    pub fn rejected(&self, scientific_name: &str) -> Option<&RejectedProfile> {
        self.rejected.get(scientific_name)
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// All valid profiles, ordered by scientific name.
    pub fn iter(&self) -> impl Iterator<Item = &SpeciesProfile> {
        self.profiles.values()
    }
}
