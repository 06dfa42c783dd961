//! Data models for Rootly.
//!
//! Species profiles are immutable reference data, validated once when they
//! enter the catalog. Plants are the only mutable records; activity events and
//! journal entries are append-only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CareError;
use crate::scheduler::DueDate;

/// How much light a species wants, on the 1..=4 scale used by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightLevel {
    Dark,
    Shade,
    PartSun,
    FullSun,
}

impl LightLevel {
    /// Map a stored ordinal to a light level.
    ///
    /// The table is fixed and exhaustive: 1 = dark, 2 = shade, 3 = part sun,
    /// 4 = full sun. Any other value is rejected rather than guessed.
    pub fn from_ordinal(value: i64) -> Result<Self, CareError> {
        match value {
            1 => Ok(LightLevel::Dark),
            2 => Ok(LightLevel::Shade),
            3 => Ok(LightLevel::PartSun),
            4 => Ok(LightLevel::FullSun),
            other => Err(CareError::UnrecognizedLightLevel(other)),
        }
    }

    pub fn ordinal(self) -> i64 {
        match self {
            LightLevel::Dark => 1,
            LightLevel::Shade => 2,
            LightLevel::PartSun => 3,
            LightLevel::FullSun => 4,
        }
    }

    /// Get a human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            LightLevel::Dark => "dark",
            LightLevel::Shade => "shade",
            LightLevel::PartSun => "part sun",
            LightLevel::FullSun => "full sun",
        }
    }
}

/// Result of describing a raw light ordinal.
///
/// This is what the rendering layer sees: either a known category with its
/// label, or the offending value marked as unrecognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LightDescriptor {
    Known {
        level: LightLevel,
        label: &'static str,
    },
    Unrecognized {
        value: i64,
    },
}

impl LightDescriptor {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            LightDescriptor::Known { label, .. } => Some(*label),
            LightDescriptor::Unrecognized { .. } => None,
        }
    }

    pub fn level(&self) -> Option<LightLevel> {
        match self {
            LightDescriptor::Known { level, .. } => Some(*level),
            LightDescriptor::Unrecognized { .. } => None,
        }
    }
}

impl From<LightLevel> for LightDescriptor {
    fn from(level: LightLevel) -> Self {
        LightDescriptor::Known {
            level,
            label: level.label(),
        }
    }
}

/// Describe a raw light ordinal without failing.
///
/// Values 1..=4 map to their category; everything else is reported as
/// `Unrecognized` with the offending value.
pub fn describe_light_level(value: i64) -> LightDescriptor {
    match LightLevel::from_ordinal(value) {
        Ok(level) => level.into(),
        Err(_) => LightDescriptor::Unrecognized { value },
    }
}

/// The kind of care action recorded against a plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Water,
    Fertilizer,
}

impl ActivityKind {
    pub const ALL: [ActivityKind; 2] = [ActivityKind::Water, ActivityKind::Fertilizer];

    pub fn label(self) -> &'static str {
        match self {
            ActivityKind::Water => "water",
            ActivityKind::Fertilizer => "fertilizer",
        }
    }
}

/// Ideal care parameters for a species.
///
/// Construct through [`SpeciesProfile::new`]; the fields are private so a
/// profile that exists has already passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesProfile {
    scientific_name: String,
    watering_interval_days: u32,
    fertilizing_interval_days: u32,
    light_level: LightLevel,
    min_temperature: f32,
    max_temperature: f32,
}

impl SpeciesProfile {
    /// Validate and build a profile.
    ///
    /// # Errors
    ///
    /// - `InvalidProfile` for an empty name, a zero or negative interval,
    ///   non-finite temperatures, or `min_temperature > max_temperature`
    /// - `UnrecognizedLightLevel` for a light ordinal outside 1..=4
    pub fn new(
        scientific_name: impl Into<String>,
        watering_interval_days: i64,
        fertilizing_interval_days: i64,
        light_level: i64,
        min_temperature: f32,
        max_temperature: f32,
    ) -> Result<Self, CareError> {
        let scientific_name = scientific_name.into();
        if scientific_name.trim().is_empty() {
            return Err(CareError::InvalidProfile(
                "scientific name must not be empty".to_string(),
            ));
        }

        let watering_interval_days =
            positive_interval(&scientific_name, "watering", watering_interval_days)?;
        let fertilizing_interval_days =
            positive_interval(&scientific_name, "fertilizing", fertilizing_interval_days)?;
        let light_level = LightLevel::from_ordinal(light_level)?;

        if !min_temperature.is_finite() || !max_temperature.is_finite() {
            return Err(CareError::InvalidProfile(format!(
                "{scientific_name}: temperatures must be finite"
            )));
        }
        if min_temperature > max_temperature {
            return Err(CareError::InvalidProfile(format!(
                "{scientific_name}: min temperature {min_temperature} exceeds max {max_temperature}"
            )));
        }

        Ok(Self {
            scientific_name,
            watering_interval_days,
            fertilizing_interval_days,
            light_level,
            min_temperature,
            max_temperature,
        })
    }

    pub fn scientific_name(&self) -> &str {
        &self.scientific_name
    }

    pub fn watering_interval_days(&self) -> u32 {
        self.watering_interval_days
    }

    pub fn fertilizing_interval_days(&self) -> u32 {
        self.fertilizing_interval_days
    }

    /// Interval for the given activity kind, in days.
    pub fn interval_days(&self, kind: ActivityKind) -> u32 {
        match kind {
            ActivityKind::Water => self.watering_interval_days,
            ActivityKind::Fertilizer => self.fertilizing_interval_days,
        }
    }

    pub fn light_level(&self) -> LightLevel {
        self.light_level
    }

    pub fn min_temperature(&self) -> f32 {
        self.min_temperature
    }

    pub fn max_temperature(&self) -> f32 {
        self.max_temperature
    }

    pub fn ideal_conditions(&self) -> IdealConditions {
        IdealConditions {
            light: describe_light_level(self.light_level.ordinal()),
            min_temperature: self.min_temperature,
            max_temperature: self.max_temperature,
            issue: None,
        }
    }
}

fn positive_interval(name: &str, what: &str, days: i64) -> Result<u32, CareError> {
    if days <= 0 {
        return Err(CareError::InvalidProfile(format!(
            "{name}: {what} interval must be positive, got {days}"
        )));
    }
    u32::try_from(days).map_err(|_| {
        CareError::InvalidProfile(format!("{name}: {what} interval {days} is too large"))
    })
}

/// The "ideal conditions" block shown on a plant's detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdealConditions {
    pub light: LightDescriptor,
    pub min_temperature: f32,
    pub max_temperature: f32,
    /// Why the stored profile was rejected, if it was. Due dates are unknown then.
    pub issue: Option<String>,
}

/// A plant owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub plant_id: i64,
    pub user_id: i64,
    pub plant_name: String,
    /// Foreign reference into the species catalog; the species may be unknown.
    pub scientific_name: String,
    pub created_on: NaiveDate,
    pub is_dead: bool,
    pub is_favorite: bool,
    pub image: Option<String>,
}

/// "This plant was watered/fertilized on this date."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub plant_id: i64,
    pub kind: ActivityKind,
    pub date: NaiveDate,
}

/// A free-form journal entry for a plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantLog {
    pub plant_id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub picture: Option<String>,
    pub height_cm: Option<f32>,
}

/// The single local user who owns a plant collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub location: Option<String>,
    pub profile_image: Option<String>,
}

/// Response for GET /users/:id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: String,
    pub location: Option<String>,
    pub profile_image: Option<String>,
    /// Plants that are still alive.
    pub number_of_plants: i64,
}

/// Request body for POST /users.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUserRequest {
    pub username: String,
    pub location: Option<String>,
    pub profile_image: Option<String>,
}

/// Request body for PUT /users/:id/username.
#[derive(Debug, Clone, Deserialize)]
pub struct UsernameRequest {
    pub username: String,
}

/// Request body for POST /plants.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlantRequest {
    pub user_id: i64,
    pub plant_name: String,
    pub scientific_name: String,
    /// Defaults to the server's current date.
    pub created_on: Option<NaiveDate>,
    pub image: Option<String>,
}

/// Request body for POST /plants/:id/activities.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityRequest {
    pub kind: ActivityKind,
    /// Defaults to the server's current date.
    pub date: Option<NaiveDate>,
}

/// Request body for POST /plants/:id/logs.
#[derive(Debug, Clone, Deserialize)]
pub struct PlantLogRequest {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    pub picture: Option<String>,
    pub height_cm: Option<f32>,
}

/// Request body for PUT /plants/:id/name.
#[derive(Debug, Clone, Deserialize)]
pub struct RenameRequest {
    pub plant_name: String,
}

/// Query parameters carrying an explicit "today".
///
/// When omitted, the handler resolves it from the server clock and passes it
/// down; nothing below the handler reads the clock.
#[derive(Debug, Default, Deserialize)]
pub struct TodayQuery {
    pub today: Option<NaiveDate>,
}

/// Next occurrence of one care activity, relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DueStatus {
    pub due: DueDate,
    /// Negative when overdue; absent when the due date is unknown.
    pub days_until: Option<i64>,
    pub overdue: bool,
}

impl DueStatus {
    pub fn new(due: DueDate, today: NaiveDate) -> Self {
        Self {
            due,
            days_until: due.days_until(today),
            overdue: due.is_overdue(today),
        }
    }
}

/// Response for GET /plants/:id/care.
#[derive(Debug, Clone, Serialize)]
pub struct CareSummary {
    pub plant_id: i64,
    pub plant_name: String,
    pub scientific_name: String,
    pub is_dead: bool,
    pub today: NaiveDate,
    /// `None` when the species is not in the catalog.
    pub conditions: Option<IdealConditions>,
    /// `None` for dead plants.
    pub water: Option<DueStatus>,
    /// `None` for dead plants.
    pub fertilizer: Option<DueStatus>,
}

/// One entry of a user's to-do list.
#[derive(Debug, Clone, Serialize)]
pub struct TodoItem {
    pub plant_id: i64,
    pub plant_name: String,
    pub kind: ActivityKind,
    pub due_on: NaiveDate,
    pub overdue: bool,
}

/// Response for GET /users/:id/todo.
#[derive(Debug, Clone, Serialize)]
pub struct TodoResponse {
    pub user_id: i64,
    pub today: NaiveDate,
    pub items: Vec<TodoItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_level_mapping_is_total() {
        assert_eq!(describe_light_level(1).label(), Some("dark"));
        assert_eq!(describe_light_level(2).label(), Some("shade"));
        assert_eq!(describe_light_level(3).label(), Some("part sun"));
        assert_eq!(describe_light_level(4).label(), Some("full sun"));

        for value in [0, 5, -1, 42, i64::MAX, i64::MIN] {
            assert_eq!(
                describe_light_level(value),
                LightDescriptor::Unrecognized { value }
            );
        }
    }

    #[test]
    fn test_light_level_ordinal_round_trip() {
        for value in 1..=4 {
            let level = LightLevel::from_ordinal(value).unwrap();
            assert_eq!(level.ordinal(), value);
        }
        assert!(matches!(
            LightLevel::from_ordinal(0),
            Err(CareError::UnrecognizedLightLevel(0))
        ));
    }

    #[test]
    fn test_species_profile_valid() {
        let profile = SpeciesProfile::new("Monstera", 2, 14, 2, 15.0, 30.0).unwrap();
        assert_eq!(profile.interval_days(ActivityKind::Water), 2);
        assert_eq!(profile.interval_days(ActivityKind::Fertilizer), 14);
        assert_eq!(profile.light_level(), LightLevel::Shade);

        let conditions = profile.ideal_conditions();
        assert_eq!(conditions.light.label(), Some("shade"));
        assert!(conditions.issue.is_none());
        assert_eq!(conditions.min_temperature, 15.0);
        assert_eq!(conditions.max_temperature, 30.0);
    }

    #[test]
    fn test_species_profile_rejects_bad_intervals() {
        assert!(matches!(
            SpeciesProfile::new("Pothos", 0, 1, 3, 15.0, 25.0),
            Err(CareError::InvalidProfile(_))
        ));
        assert!(matches!(
            SpeciesProfile::new("Pothos", 2, -3, 3, 15.0, 25.0),
            Err(CareError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_species_profile_rejects_bad_light_and_temperature() {
        assert!(matches!(
            SpeciesProfile::new("Pothos", 2, 1, 5, 15.0, 25.0),
            Err(CareError::UnrecognizedLightLevel(5))
        ));
        assert!(matches!(
            SpeciesProfile::new("Pothos", 2, 1, 3, 25.0, 15.0),
            Err(CareError::InvalidProfile(_))
        ));
        assert!(matches!(
            SpeciesProfile::new("Pothos", 2, 1, 3, f32::NAN, 15.0),
            Err(CareError::InvalidProfile(_))
        ));
        assert!(matches!(
            SpeciesProfile::new("  ", 2, 1, 3, 10.0, 15.0),
            Err(CareError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_equal_temperatures_allowed() {
        assert!(SpeciesProfile::new("Pilea", 4, 1, 3, 20.0, 20.0).is_ok());
    }

    #[test]
    fn test_light_descriptor_serialization() {
        let json = serde_json::to_value(describe_light_level(3)).unwrap();
        assert_eq!(json["status"], "known");
        assert_eq!(json["level"], "part_sun");
        assert_eq!(json["label"], "part sun");

        let json = serde_json::to_value(describe_light_level(9)).unwrap();
        assert_eq!(json["status"], "unrecognized");
        assert_eq!(json["value"], 9);
    }
}
