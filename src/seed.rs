//! Seed data: the default species catalog and an optional demo garden.
//!
//! Species are inserted into an empty database at startup. The demo garden
//! (ten plants with watering, fertilizing and journal history in January 2022)
//! is only loaded when explicitly requested.

use chrono::{Days, NaiveDate};
use tracing::info;

use crate::error::CareError;
use crate::model::{ActivityKind, PlantLog, SpeciesProfile};
use crate::storage::{NewPlant, NewUser, Storage};

/// (scientific name, watering days, fertilizing days, light 1..=4, min °C, max °C)
const DEFAULT_SPECIES: &[(&str, i64, i64, i64, f32, f32)] = &[
    ("Spider Plant", 2, 2, 2, 10.0, 25.0),
    ("Snake Plant", 3, 1, 1, 15.0, 30.0),
    ("Pothos", 2, 1, 3, 15.0, 25.0),
    ("Peace Lily", 2, 1, 3, 15.0, 25.0),
    ("ZZ Plant", 4, 1, 1, 15.0, 30.0),
    ("Monstera", 2, 2, 2, 15.0, 30.0),
    ("Philodendron", 2, 2, 3, 15.0, 25.0),
    ("Rubber Plant", 2, 2, 2, 10.0, 25.0),
    ("Fiddle Leaf Fig", 2, 3, 3, 15.0, 25.0),
    ("Aloe Vera", 4, 2, 4, 10.0, 35.0),
    ("English Ivy", 3, 1, 3, 15.0, 25.0),
    ("Chinese Evergreen", 2, 1, 3, 15.0, 25.0),
    ("Parlor Palm", 2, 1, 3, 15.0, 25.0),
    ("Fern", 2, 2, 3, 15.0, 25.0),
    ("Jade Plant", 4, 2, 4, 10.0, 35.0),
    ("Succulent", 4, 2, 4, 10.0, 35.0),
    ("Calathea", 2, 2, 2, 15.0, 25.0),
    ("Bird of Paradise", 2, 3, 3, 15.0, 30.0),
    ("Money Tree", 3, 2, 4, 15.0, 30.0),
    ("Dracaena", 3, 2, 3, 15.0, 30.0),
    ("Pilea", 4, 1, 3, 15.0, 25.0),
    ("Christmas Cactus", 2, 1, 2, 10.0, 25.0),
    ("Hoya", 3, 1, 3, 15.0, 25.0),
    ("Dieffenbachia", 2, 1, 3, 15.0, 25.0),
    ("Oxalis", 2, 1, 3, 15.0, 25.0),
    ("Bromeliad", 2, 2, 2, 15.0, 25.0),
    ("Schefflera", 2, 1, 3, 15.0, 25.0),
    ("String of Pearls", 4, 1, 4, 10.0, 35.0),
];

/// Creation date of every demo plant.
const DEMO_START: NaiveDate = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();

/// Number of plants in the demo garden.
pub const DEMO_PLANT_COUNT: u32 = 10;

/// The default species profiles.
pub fn default_species() -> Result<Vec<SpeciesProfile>, CareError> {
    DEFAULT_SPECIES
        .iter()
        .map(|&(name, water, fertilizer, light, min, max)| {
            SpeciesProfile::new(name, water, fertilizer, light, min, max)
        })
        .collect()
}

/// Insert the default species if the species table is empty.
///
/// Returns the number of species inserted.
pub async fn seed_species(storage: &Storage) -> Result<usize, CareError> {
    if storage.count_species().await? > 0 {
        return Ok(0);
    }

    let species = default_species()?;
    for profile in &species {
        storage.insert_species(profile).await?;
    }

    info!(count = species.len(), "Seeded species catalog");
    Ok(species.len())
}

/// Create the demo garden for `user_id` unless that user already has plants.
///
/// The user itself is created as `user1` when missing.
///
/// Plant `i` (1-based) is a Spider Plant when `i` is even and a Snake Plant
/// otherwise. All are created on 2022-01-01, watered on January `i + 5`,
/// fertilized on January `i + 15`, and have one 15 cm journal entry on
/// January `i + 10`.
///
/// Returns the number of plants created.
pub async fn seed_demo(storage: &Storage, user_id: i64) -> Result<usize, CareError> {
    if storage.get_user_profile(user_id).await?.is_none() {
        storage
            .insert_user(
                Some(user_id),
                &NewUser {
                    username: "user1".to_string(),
                    location: Some("Location 1".to_string()),
                    profile_image: Some("path_to_profile_image".to_string()),
                },
            )
            .await?;
    }

    if !storage.list_plants(user_id).await?.is_empty() {
        return Ok(0);
    }

    for i in 1..=DEMO_PLANT_COUNT {
        let species = if i % 2 == 0 { "Spider Plant" } else { "Snake Plant" };
        let plant = storage
            .insert_plant(&NewPlant {
                user_id,
                plant_name: format!("Plant {i}"),
                scientific_name: species.to_string(),
                created_on: DEMO_START,
                image: None,
            })
            .await?;

        storage
            .record_activity(plant.plant_id, ActivityKind::Water, january_2022(i + 5))
            .await?;
        storage
            .record_activity(plant.plant_id, ActivityKind::Fertilizer, january_2022(i + 15))
            .await?;
        storage
            .add_plant_log(&PlantLog {
                plant_id: plant.plant_id,
                date: january_2022(i + 10),
                description: format!("Log for Plant {i}"),
                picture: Some(format!("path_to_picture_{i}")),
                height_cm: Some(15.0),
            })
            .await?;
    }

    info!(user_id, count = DEMO_PLANT_COUNT, "Seeded demo garden");
    Ok(DEMO_PLANT_COUNT as usize)
}

fn january_2022(day: u32) -> NaiveDate {
    DEMO_START + Days::new(u64::from(day - 1))
}
