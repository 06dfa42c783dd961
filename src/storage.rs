//! SQLite storage layer for Rootly.
//!
//! This is the data-access collaborator of the care scheduler: it hands out
//! plants, species profiles and activity histories, and records user actions.
//! Dates are stored as ISO `YYYY-MM-DD` text, so lexical order is date order.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::warn;

use crate::catalog::{RejectedProfile, SpeciesCatalog};
use crate::error::CareError;
use crate::model::{ActivityKind, Plant, PlantLog, SpeciesProfile, User, UserProfile};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

/// Fields of a user that the caller supplies.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub location: Option<String>,
    pub profile_image: Option<String>,
}

/// Fields of a plant that the caller supplies; the id is assigned on insert.
#[derive(Debug, Clone)]
pub struct NewPlant {
    pub user_id: i64,
    pub plant_name: String,
    pub scientific_name: String,
    pub created_on: NaiveDate,
    pub image: Option<String>,
}

impl Storage {
    /// Create a new storage instance and initialize the schema.
    ///
    /// # Arguments
    ///
    /// * `database_url` - SQLite connection string (e.g., "sqlite:rootly.db" or "sqlite::memory:")
    pub async fn new(database_url: &str) -> Result<Self, CareError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        let storage = Self { pool };
        storage.initialize_schema().await?;

        Ok(storage)
    }

    async fn initialize_schema(&self) -> Result<(), CareError> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                location TEXT,
                profile_image TEXT
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS species (
                scientific_name TEXT PRIMARY KEY,
                watering_interval INTEGER NOT NULL,
                fertilizing_interval INTEGER NOT NULL,
                light_level INTEGER NOT NULL,
                min_temperature REAL NOT NULL,
                max_temperature REAL NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS plants (
                plant_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                plant_name TEXT NOT NULL,
                scientific_name TEXT NOT NULL,
                created_on TEXT NOT NULL,
                is_dead INTEGER NOT NULL DEFAULT 0,
                is_favorite INTEGER NOT NULL DEFAULT 0,
                image TEXT
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_plants_user
            ON plants(user_id)
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS waters (
                plant_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                PRIMARY KEY (plant_id, date)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS fertilizers (
                plant_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                PRIMARY KEY (plant_id, date)
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS plant_logs (
                log_id INTEGER PRIMARY KEY AUTOINCREMENT,
                plant_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                picture TEXT,
                height_cm REAL
            )
            "#,
            r#"
            CREATE INDEX IF NOT EXISTS idx_plant_logs_plant_date
            ON plant_logs(plant_id, date)
            "#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Species
    // ------------------------------------------------------------------

    /// Insert a species profile.
    ///
    /// # Errors
    ///
    /// `DuplicateSpecies` if the scientific name is already present.
    pub async fn insert_species(&self, profile: &SpeciesProfile) -> Result<(), CareError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO species
                (scientific_name, watering_interval, fertilizing_interval,
                 light_level, min_temperature, max_temperature)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(profile.scientific_name())
        .bind(i64::from(profile.watering_interval_days()))
        .bind(i64::from(profile.fertilizing_interval_days()))
        .bind(profile.light_level().ordinal())
        .bind(profile.min_temperature())
        .bind(profile.max_temperature())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CareError::DuplicateSpecies(
                profile.scientific_name().to_string(),
            ));
        }
        Ok(())
    }

    /// Fetch one species profile. Unknown names yield `None`.
    ///
    /// A stored row that fails validation surfaces as `InvalidProfile` or
    /// `UnrecognizedLightLevel` instead of being coerced.
    pub async fn get_species_profile(
        &self,
        scientific_name: &str,
    ) -> Result<Option<SpeciesProfile>, CareError> {
        let row = sqlx::query(
            r#"
            SELECT scientific_name, watering_interval, fertilizing_interval,
                   light_level, min_temperature, max_temperature
            FROM species
            WHERE scientific_name = ?
            "#,
        )
        .bind(scientific_name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(|row| StoredSpecies::from_row(row)?.validate())
            .transpose()
    }

    async fn list_stored_species(&self) -> Result<Vec<StoredSpecies>, CareError> {
        let rows = sqlx::query(
            r#"
            SELECT scientific_name, watering_interval, fertilizing_interval,
                   light_level, min_temperature, max_temperature
            FROM species
            ORDER BY scientific_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(StoredSpecies::from_row).collect()
    }

    pub async fn count_species(&self) -> Result<i64, CareError> {
        let row = sqlx::query("SELECT COUNT(*) as total FROM species")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }

    /// Load every stored species into an in-memory catalog.
    ///
    /// Rows are validated one by one. A row that fails validation is logged
    /// and kept as a rejected entry, so its conditions render as unrecognized
    /// while the rest of the catalog stays usable. Only database failures
    /// abort the load.
    pub async fn load_catalog(&self) -> Result<SpeciesCatalog, CareError> {
        let mut profiles = Vec::new();
        let mut rejected = Vec::new();

        for stored in self.list_stored_species().await? {
            match stored.validate() {
                Ok(profile) => profiles.push(profile),
                Err(e) if e.is_client_error() => {
                    warn!(
                        species = %stored.scientific_name,
                        error = %e,
                        "Invalid species profile, conditions will be unrecognized"
                    );
                    rejected.push(RejectedProfile::new(
                        stored.scientific_name,
                        stored.light_level,
                        stored.min_temperature,
                        stored.max_temperature,
                        &e,
                    ));
                }
                Err(e) => return Err(e),
            }
        }

        SpeciesCatalog::from_parts(profiles, rejected)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert a user. With `user_id = None` the id is assigned by the database.
    pub async fn insert_user(
        &self,
        user_id: Option<i64>,
        user: &NewUser,
    ) -> Result<User, CareError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (user_id, username, location, profile_image)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&user.username)
        .bind(&user.location)
        .bind(&user.profile_image)
        .execute(&self.pool)
        .await?;

        Ok(User {
            user_id: result.last_insert_rowid(),
            username: user.username.clone(),
            location: user.location.clone(),
            profile_image: user.profile_image.clone(),
        })
    }

    /// A user together with the number of plants still alive.
    pub async fn get_user_profile(&self, user_id: i64) -> Result<Option<UserProfile>, CareError> {
        let row = sqlx::query(
            r#"
            SELECT u.user_id, u.username, u.location, u.profile_image,
                   (SELECT COUNT(*) FROM plants p
                    WHERE p.user_id = u.user_id AND p.is_dead = 0) AS number_of_plants
            FROM users u
            WHERE u.user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_profile_from_row).transpose()
    }

    pub async fn set_username(&self, user_id: i64, username: &str) -> Result<(), CareError> {
        let result = sqlx::query("UPDATE users SET username = ? WHERE user_id = ?")
            .bind(username)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CareError::user_not_found(user_id));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Plants
    // ------------------------------------------------------------------

    /// Insert a plant and return it with its assigned id.
    pub async fn insert_plant(&self, plant: &NewPlant) -> Result<Plant, CareError> {
        let result = sqlx::query(
            r#"
            INSERT INTO plants (user_id, plant_name, scientific_name, created_on, image)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(plant.user_id)
        .bind(&plant.plant_name)
        .bind(&plant.scientific_name)
        .bind(format_date(plant.created_on))
        .bind(&plant.image)
        .execute(&self.pool)
        .await?;

        Ok(Plant {
            plant_id: result.last_insert_rowid(),
            user_id: plant.user_id,
            plant_name: plant.plant_name.clone(),
            scientific_name: plant.scientific_name.clone(),
            created_on: plant.created_on,
            is_dead: false,
            is_favorite: false,
            image: plant.image.clone(),
        })
    }

    pub async fn get_plant(&self, plant_id: i64) -> Result<Option<Plant>, CareError> {
        let row = sqlx::query(
            r#"
            SELECT plant_id, user_id, plant_name, scientific_name, created_on,
                   is_dead, is_favorite, image
            FROM plants
            WHERE plant_id = ?
            "#,
        )
        .bind(plant_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(plant_from_row).transpose()
    }

    /// Like [`get_plant`](Self::get_plant), but a missing plant is `NotFound`.
    pub async fn require_plant(&self, plant_id: i64) -> Result<Plant, CareError> {
        self.get_plant(plant_id)
            .await?
            .ok_or_else(|| CareError::plant_not_found(plant_id))
    }

    /// All plants of a user, dead ones included, ordered by id.
    pub async fn list_plants(&self, user_id: i64) -> Result<Vec<Plant>, CareError> {
        let rows = sqlx::query(
            r#"
            SELECT plant_id, user_id, plant_name, scientific_name, created_on,
                   is_dead, is_favorite, image
            FROM plants
            WHERE user_id = ?
            ORDER BY plant_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(plant_from_row).collect()
    }

    /// Living plants a user marked as favorite.
    pub async fn list_favorites(&self, user_id: i64) -> Result<Vec<Plant>, CareError> {
        let rows = sqlx::query(
            r#"
            SELECT plant_id, user_id, plant_name, scientific_name, created_on,
                   is_dead, is_favorite, image
            FROM plants
            WHERE user_id = ? AND is_favorite = 1 AND is_dead = 0
            ORDER BY plant_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(plant_from_row).collect()
    }

    pub async fn rename_plant(&self, plant_id: i64, plant_name: &str) -> Result<(), CareError> {
        let result = sqlx::query("UPDATE plants SET plant_name = ? WHERE plant_id = ?")
            .bind(plant_name)
            .bind(plant_id)
            .execute(&self.pool)
            .await?;
        expect_one_row(result.rows_affected(), plant_id)
    }

    /// Mark a plant as dead. Marking it again is a no-op.
    pub async fn mark_dead(&self, plant_id: i64) -> Result<(), CareError> {
        let result = sqlx::query("UPDATE plants SET is_dead = 1 WHERE plant_id = ?")
            .bind(plant_id)
            .execute(&self.pool)
            .await?;
        expect_one_row(result.rows_affected(), plant_id)
    }

    pub async fn set_favorite(&self, plant_id: i64, favorite: bool) -> Result<(), CareError> {
        let result = sqlx::query("UPDATE plants SET is_favorite = ? WHERE plant_id = ?")
            .bind(favorite)
            .bind(plant_id)
            .execute(&self.pool)
            .await?;
        expect_one_row(result.rows_affected(), plant_id)
    }

    /// Delete a plant together with its activity history and journal.
    pub async fn delete_plant(&self, plant_id: i64) -> Result<(), CareError> {
        let mut tx = self.pool.begin().await?;

        for table in ["waters", "fertilizers", "plant_logs"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE plant_id = ?"))
                .bind(plant_id)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query("DELETE FROM plants WHERE plant_id = ?")
            .bind(plant_id)
            .execute(&mut *tx)
            .await?;
        expect_one_row(result.rows_affected(), plant_id)?;

        tx.commit().await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Activity history
    // ------------------------------------------------------------------

    /// Record that a plant was watered or fertilized on a date.
    ///
    /// Events are keyed by (plant, date), so recording the same day twice is
    /// a no-op. Returns whether a new event was stored.
    pub async fn record_activity(
        &self,
        plant_id: i64,
        kind: ActivityKind,
        date: NaiveDate,
    ) -> Result<bool, CareError> {
        self.require_plant(plant_id).await?;

        let result = sqlx::query(&format!(
            "INSERT OR IGNORE INTO {} (plant_id, date) VALUES (?, ?)",
            activity_table(kind)
        ))
        .bind(plant_id)
        .bind(format_date(date))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Dates of past events of one kind, on or before `up_to`, oldest first.
    ///
    /// Events after `up_to` are excluded so the scheduler never sees the future.
    pub async fn get_activity_history(
        &self,
        plant_id: i64,
        kind: ActivityKind,
        up_to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, CareError> {
        let rows = sqlx::query(&format!(
            "SELECT date FROM {} WHERE plant_id = ? AND date <= ? ORDER BY date",
            activity_table(kind)
        ))
        .bind(plant_id)
        .bind(format_date(up_to))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| parse_date(&row.try_get::<String, _>("date")?))
            .collect()
    }

    /// Most recent event date of one kind for each of a user's plants, on or
    /// before `up_to`. Plants with no such event are absent from the map.
    pub async fn last_activity_dates(
        &self,
        user_id: i64,
        kind: ActivityKind,
        up_to: NaiveDate,
    ) -> Result<HashMap<i64, NaiveDate>, CareError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT a.plant_id, MAX(a.date) AS last_date
            FROM {} a
            JOIN plants p ON p.plant_id = a.plant_id
            WHERE p.user_id = ? AND a.date <= ?
            GROUP BY a.plant_id
            "#,
            activity_table(kind)
        ))
        .bind(user_id)
        .bind(format_date(up_to))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let plant_id: i64 = row.try_get("plant_id")?;
                let last = parse_date(&row.try_get::<String, _>("last_date")?)?;
                Ok((plant_id, last))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Journal
    // ------------------------------------------------------------------

    pub async fn add_plant_log(&self, log: &PlantLog) -> Result<(), CareError> {
        self.require_plant(log.plant_id).await?;

        sqlx::query(
            r#"
            INSERT INTO plant_logs (plant_id, date, description, picture, height_cm)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(log.plant_id)
        .bind(format_date(log.date))
        .bind(&log.description)
        .bind(&log.picture)
        .bind(log.height_cm)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Journal entries of a plant, oldest first.
    pub async fn list_plant_logs(&self, plant_id: i64) -> Result<Vec<PlantLog>, CareError> {
        let rows = sqlx::query(
            r#"
            SELECT plant_id, date, description, picture, height_cm
            FROM plant_logs
            WHERE plant_id = ?
            ORDER BY date, log_id
            "#,
        )
        .bind(plant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PlantLog {
                    plant_id: row.try_get("plant_id")?,
                    date: parse_date(&row.try_get::<String, _>("date")?)?,
                    description: row.try_get("description")?,
                    picture: row.try_get("picture")?,
                    height_cm: row.try_get("height_cm")?,
                })
            })
            .collect()
    }
}

fn activity_table(kind: ActivityKind) -> &'static str {
    match kind {
        ActivityKind::Water => "waters",
        ActivityKind::Fertilizer => "fertilizers",
    }
}

fn expect_one_row(rows_affected: u64, plant_id: i64) -> Result<(), CareError> {
    if rows_affected == 0 {
        Err(CareError::plant_not_found(plant_id))
    } else {
        Ok(())
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(text: &str) -> Result<NaiveDate, CareError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| CareError::Storage(sqlx::Error::Decode(Box::new(e))))
}

/// A species row exactly as stored, before validation.
struct StoredSpecies {
    scientific_name: String,
    watering_interval: i64,
    fertilizing_interval: i64,
    light_level: i64,
    min_temperature: f32,
    max_temperature: f32,
}

impl StoredSpecies {
    fn from_row(row: &SqliteRow) -> Result<Self, CareError> {
        Ok(Self {
            scientific_name: row.try_get("scientific_name")?,
            watering_interval: row.try_get("watering_interval")?,
            fertilizing_interval: row.try_get("fertilizing_interval")?,
            light_level: row.try_get("light_level")?,
            min_temperature: row.try_get("min_temperature")?,
            max_temperature: row.try_get("max_temperature")?,
        })
    }

    fn validate(&self) -> Result<SpeciesProfile, CareError> {
        SpeciesProfile::new(
            self.scientific_name.clone(),
            self.watering_interval,
            self.fertilizing_interval,
            self.light_level,
            self.min_temperature,
            self.max_temperature,
        )
    }
}

fn user_profile_from_row(row: &SqliteRow) -> Result<UserProfile, CareError> {
    Ok(UserProfile {
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        location: row.try_get("location")?,
        profile_image: row.try_get("profile_image")?,
        number_of_plants: row.try_get("number_of_plants")?,
    })
}

fn plant_from_row(row: &SqliteRow) -> Result<Plant, CareError> {
    Ok(Plant {
        plant_id: row.try_get("plant_id")?,
        user_id: row.try_get("user_id")?,
        plant_name: row.try_get("plant_name")?,
        scientific_name: row.try_get("scientific_name")?,
        created_on: parse_date(&row.try_get::<String, _>("created_on")?)?,
        is_dead: row.try_get("is_dead")?,
        is_favorite: row.try_get("is_favorite")?,
        image: row.try_get("image")?,
    })
}
