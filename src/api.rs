//! HTTP API handlers for Rootly.
//!
//! The rendering layer talks to these endpoints and gets back plain JSON value
//! types: plants, species profiles, due dates and "unknown" markers.
//!
//! Every handler that depends on the current date accepts an optional
//! `today=YYYY-MM-DD` query parameter. When it is absent the handler reads the
//! server clock once and passes the date down explicitly.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use tracing::{info, instrument, warn};

use crate::care::{due_today, plant_care_summary};
use crate::catalog::SpeciesCatalog;
use crate::error::CareError;
use crate::model::{
    ActivityEvent, ActivityRequest, CareSummary, NewPlantRequest, NewUserRequest, Plant,
    PlantLog, PlantLogRequest, RenameRequest, SpeciesProfile, TodayQuery, TodoResponse, User,
    UserProfile, UsernameRequest,
};
use crate::storage::{NewPlant, NewUser, Storage};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub catalog: Arc<SpeciesCatalog>,
}

/// Build the router with every endpoint mounted.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/species", get(list_species))
        .route("/species/:name", get(get_species))
        .route("/plants", post(create_plant))
        .route("/plants/:id", get(get_plant).delete(delete_plant))
        .route("/plants/:id/name", put(rename_plant))
        .route("/plants/:id/dead", post(mark_dead))
        .route("/plants/:id/favorite", put(add_favorite).delete(remove_favorite))
        .route("/plants/:id/activities", post(record_activity))
        .route("/plants/:id/care", get(get_care))
        .route("/plants/:id/logs", get(list_logs).post(add_log))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id/username", put(update_username))
        .route("/users/:id/plants", get(list_user_plants))
        .route("/users/:id/favorites", get(list_user_favorites))
        .route("/users/:id/todo", get(get_todo))
        .with_state(state)
}

/// Map a domain error to the status code the client sees.
fn error_status(error: &CareError) -> StatusCode {
    match error {
        CareError::NotFound { .. } => StatusCode::NOT_FOUND,
        CareError::InvalidProfile(_)
        | CareError::UnrecognizedLightLevel(_)
        | CareError::DuplicateSpecies(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CareError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn resolve_today(query: &TodayQuery) -> NaiveDate {
    query.today.unwrap_or_else(|| Utc::now().date_naive())
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /species - All species in the catalog, ordered by scientific name.
pub async fn list_species(State(state): State<AppState>) -> Json<Vec<SpeciesProfile>> {
    Json(state.catalog.iter().cloned().collect())
}

/// GET /species/:name - One species profile.
///
/// An unknown name is a plain 404; callers render "conditions unknown".
#[instrument(skip(state))]
pub async fn get_species(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SpeciesProfile>, StatusCode> {
    match state.catalog.require(&name) {
        Ok(profile) => Ok(Json(profile.clone())),
        Err(e) => {
            info!(species = %name, error = %e, "Species lookup missed");
            Err(error_status(&e))
        }
    }
}

/// POST /plants - Add a plant to a user's collection.
///
/// # Request Body
///
/// ```json
/// {
///     "user_id": 1,
///     "plant_name": "Spidey",
///     "scientific_name": "Spider Plant",
///     "created_on": "2022-01-01"
/// }
/// ```
///
/// `created_on` defaults to today; `image` is optional.
///
/// # Response
///
/// Returns `201 Created` with the stored plant.
#[instrument(skip(state, request), fields(user_id = request.user_id))]
pub async fn create_plant(
    State(state): State<AppState>,
    Json(request): Json<NewPlantRequest>,
) -> Result<(StatusCode, Json<Plant>), StatusCode> {
    let plant_name = request.plant_name.trim();
    if plant_name.is_empty() {
        warn!("Rejected plant with empty name");
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    if !state.catalog.contains(&request.scientific_name) {
        warn!(
            species = %request.scientific_name,
            "Plant references a species missing from the catalog"
        );
    }

    let new_plant = NewPlant {
        user_id: request.user_id,
        plant_name: plant_name.to_string(),
        scientific_name: request.scientific_name,
        created_on: request
            .created_on
            .unwrap_or_else(|| Utc::now().date_naive()),
        image: request.image,
    };

    match state.storage.insert_plant(&new_plant).await {
        Ok(plant) => {
            info!(plant_id = plant.plant_id, "Plant created");
            Ok((StatusCode::CREATED, Json(plant)))
        }
        Err(e) => {
            warn!(error = %e, "Failed to create plant");
            Err(error_status(&e))
        }
    }
}

/// GET /plants/:id
#[instrument(skip(state))]
pub async fn get_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<i64>,
) -> Result<Json<Plant>, StatusCode> {
    state
        .storage
        .require_plant(plant_id)
        .await
        .map(Json)
        .map_err(|e| {
            warn!(plant_id, error = %e, "Failed to fetch plant");
            error_status(&e)
        })
}

/// DELETE /plants/:id - Remove a plant with its history and journal.
#[instrument(skip(state))]
pub async fn delete_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<i64>,
) -> StatusCode {
    match state.storage.delete_plant(plant_id).await {
        Ok(()) => {
            info!(plant_id, "Plant deleted");
            StatusCode::NO_CONTENT
        }
        Err(e) => {
            warn!(plant_id, error = %e, "Failed to delete plant");
            error_status(&e)
        }
    }
}

/// PUT /plants/:id/name
#[instrument(skip(state, request))]
pub async fn rename_plant(
    State(state): State<AppState>,
    Path(plant_id): Path<i64>,
    Json(request): Json<RenameRequest>,
) -> StatusCode {
    let plant_name = request.plant_name.trim();
    if plant_name.is_empty() {
        return StatusCode::UNPROCESSABLE_ENTITY;
    }

    match state.storage.rename_plant(plant_id, plant_name).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            warn!(plant_id, error = %e, "Failed to rename plant");
            error_status(&e)
        }
    }
}

/// POST /plants/:id/dead - Mark a plant as dead.
#[instrument(skip(state))]
pub async fn mark_dead(State(state): State<AppState>, Path(plant_id): Path<i64>) -> StatusCode {
    match state.storage.mark_dead(plant_id).await {
        Ok(()) => {
            info!(plant_id, "Plant marked as dead");
            StatusCode::NO_CONTENT
        }
        Err(e) => {
            warn!(plant_id, error = %e, "Failed to mark plant as dead");
            error_status(&e)
        }
    }
}

/// PUT /plants/:id/favorite
pub async fn add_favorite(state: State<AppState>, plant_id: Path<i64>) -> StatusCode {
    set_favorite(state, plant_id, true).await
}

/// DELETE /plants/:id/favorite
pub async fn remove_favorite(state: State<AppState>, plant_id: Path<i64>) -> StatusCode {
    set_favorite(state, plant_id, false).await
}

#[instrument(skip(state))]
async fn set_favorite(
    State(state): State<AppState>,
    Path(plant_id): Path<i64>,
    favorite: bool,
) -> StatusCode {
    match state.storage.set_favorite(plant_id, favorite).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            warn!(plant_id, favorite, error = %e, "Failed to update favorite");
            error_status(&e)
        }
    }
}

/// POST /plants/:id/activities - Record a watering or fertilizing.
///
/// # Request Body
///
/// ```json
/// { "kind": "water", "date": "2022-01-01" }
/// ```
///
/// `date` defaults to today. Returns `201 Created` for a new event and
/// `200 OK` if the plant already had that activity on that date.
#[instrument(skip(state, request), fields(kind = request.kind.label()))]
pub async fn record_activity(
    State(state): State<AppState>,
    Path(plant_id): Path<i64>,
    Json(request): Json<ActivityRequest>,
) -> Result<(StatusCode, Json<ActivityEvent>), StatusCode> {
    let date = request.date.unwrap_or_else(|| Utc::now().date_naive());

    match state
        .storage
        .record_activity(plant_id, request.kind, date)
        .await
    {
        Ok(inserted) => {
            info!(plant_id, %date, inserted, "Activity recorded");
            let status = if inserted {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            Ok((
                status,
                Json(ActivityEvent {
                    plant_id,
                    kind: request.kind,
                    date,
                }),
            ))
        }
        Err(e) => {
            warn!(plant_id, error = %e, "Failed to record activity");
            Err(error_status(&e))
        }
    }
}

/// GET /plants/:id/care - Ideal conditions and next due dates.
///
/// # Response
///
/// ```json
/// {
///     "plant_id": 1,
///     "plant_name": "Spidey",
///     "scientific_name": "Spider Plant",
///     "is_dead": false,
///     "today": "2022-01-02",
///     "conditions": {
///         "light": { "status": "known", "level": "shade", "label": "shade" },
///         "min_temperature": 10.0,
///         "max_temperature": 25.0,
///         "issue": null
///     },
///     "water": {
///         "due": { "state": "scheduled", "date": "2022-01-03" },
///         "days_until": 1,
///         "overdue": false
///     },
///     "fertilizer": { "due": { "state": "unknown" }, "days_until": null, "overdue": false }
/// }
/// ```
///
/// `conditions` is null for an unknown species; `water` and `fertilizer` are
/// null for a dead plant. A species whose stored profile is invalid reports
/// `"light": { "status": "unrecognized", "value": 9 }` with `issue` set, and
/// both due dates unknown.
#[instrument(skip(state))]
pub async fn get_care(
    State(state): State<AppState>,
    Path(plant_id): Path<i64>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<CareSummary>, StatusCode> {
    let today = resolve_today(&query);

    match plant_care_summary(&state.storage, &state.catalog, plant_id, today).await {
        Ok(summary) => {
            info!(
                plant_id,
                %today,
                known_species = summary.conditions.is_some(),
                "Care summary computed"
            );
            Ok(Json(summary))
        }
        Err(e) => {
            warn!(plant_id, error = %e, "Failed to compute care summary");
            Err(error_status(&e))
        }
    }
}

/// POST /plants/:id/logs - Append a journal entry.
#[instrument(skip(state, request))]
pub async fn add_log(
    State(state): State<AppState>,
    Path(plant_id): Path<i64>,
    Json(request): Json<PlantLogRequest>,
) -> Result<(StatusCode, Json<PlantLog>), StatusCode> {
    let log = PlantLog {
        plant_id,
        date: request.date.unwrap_or_else(|| Utc::now().date_naive()),
        description: request.description,
        picture: request.picture,
        height_cm: request.height_cm,
    };

    match state.storage.add_plant_log(&log).await {
        Ok(()) => {
            info!(plant_id, date = %log.date, "Journal entry added");
            Ok((StatusCode::CREATED, Json(log)))
        }
        Err(e) => {
            warn!(plant_id, error = %e, "Failed to add journal entry");
            Err(error_status(&e))
        }
    }
}

/// GET /plants/:id/logs - Journal entries, oldest first.
#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    Path(plant_id): Path<i64>,
) -> Result<Json<Vec<PlantLog>>, StatusCode> {
    let result = match state.storage.require_plant(plant_id).await {
        Ok(_) => state.storage.list_plant_logs(plant_id).await,
        Err(e) => Err(e),
    };

    result.map(Json).map_err(|e| {
        warn!(plant_id, error = %e, "Failed to list journal entries");
        error_status(&e)
    })
}

/// POST /users - Create a user.
///
/// # Request Body
///
/// ```json
/// { "username": "user2", "location": "Porto", "profile_image": null }
/// ```
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<NewUserRequest>,
) -> Result<(StatusCode, Json<User>), StatusCode> {
    let username = request.username.trim();
    if username.is_empty() {
        warn!("Rejected user with empty username");
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let new_user = NewUser {
        username: username.to_string(),
        location: request.location,
        profile_image: request.profile_image,
    };

    match state.storage.insert_user(None, &new_user).await {
        Ok(user) => {
            info!(user_id = user.user_id, "User created");
            Ok((StatusCode::CREATED, Json(user)))
        }
        Err(e) => {
            warn!(error = %e, "Failed to create user");
            Err(error_status(&e))
        }
    }
}

/// GET /users/:id - Profile with the number of live plants.
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserProfile>, StatusCode> {
    let result = match state.storage.get_user_profile(user_id).await {
        Ok(Some(profile)) => Ok(profile),
        Ok(None) => Err(CareError::user_not_found(user_id)),
        Err(e) => Err(e),
    };

    result.map(Json).map_err(|e| {
        warn!(user_id, error = %e, "Failed to fetch user");
        error_status(&e)
    })
}

/// PUT /users/:id/username
#[instrument(skip(state, request))]
pub async fn update_username(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<UsernameRequest>,
) -> StatusCode {
    let username = request.username.trim();
    if username.is_empty() {
        return StatusCode::UNPROCESSABLE_ENTITY;
    }

    match state.storage.set_username(user_id, username).await {
        Ok(()) => {
            info!(user_id, "Username updated");
            StatusCode::NO_CONTENT
        }
        Err(e) => {
            warn!(user_id, error = %e, "Failed to update username");
            error_status(&e)
        }
    }
}

/// GET /users/:id/plants
#[instrument(skip(state))]
pub async fn list_user_plants(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Plant>>, StatusCode> {
    state.storage.list_plants(user_id).await.map(Json).map_err(|e| {
        warn!(user_id, error = %e, "Failed to list plants");
        error_status(&e)
    })
}

/// GET /users/:id/favorites
#[instrument(skip(state))]
pub async fn list_user_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Plant>>, StatusCode> {
    state
        .storage
        .list_favorites(user_id)
        .await
        .map(Json)
        .map_err(|e| {
            warn!(user_id, error = %e, "Failed to list favorites");
            error_status(&e)
        })
}

/// GET /users/:id/todo - Care activities due on or before today.
#[instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<TodayQuery>,
) -> Result<Json<TodoResponse>, StatusCode> {
    let today = resolve_today(&query);

    match due_today(&state.storage, &state.catalog, user_id, today).await {
        Ok(response) => {
            info!(user_id, %today, item_count = response.items.len(), "To-do list computed");
            Ok(Json(response))
        }
        Err(e) => {
            warn!(user_id, error = %e, "Failed to compute to-do list");
            Err(error_status(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_status(&CareError::plant_not_found(1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&CareError::UnrecognizedLightLevel(0)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            error_status(&CareError::Storage(sqlx::Error::PoolClosed)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_resolve_today_prefers_query() {
        let today = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        assert_eq!(resolve_today(&TodayQuery { today: Some(today) }), today);
    }
}
