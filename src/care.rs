//! Care summaries and to-do lists.
//!
//! This module glues the data-access layer to the pure scheduler: it fetches a
//! plant and its histories from [`Storage`], looks the species up in the
//! [`SpeciesCatalog`], and hands everything to [`next_due_for_plant`].
//!
//! Dead plants get no due dates. The scheduler itself does not know about
//! death; the guard lives here.

use chrono::NaiveDate;

use crate::catalog::SpeciesCatalog;
use crate::error::CareError;
use crate::model::{ActivityKind, CareSummary, DueStatus, Plant, TodoItem, TodoResponse};
use crate::scheduler::{DueDate, next_due_for_plant};
use crate::storage::Storage;

/// Compute the next due date of one activity for a stored plant.
///
/// Only history on or before `today` is considered.
pub async fn due_date_for(
    storage: &Storage,
    catalog: &SpeciesCatalog,
    plant: &Plant,
    kind: ActivityKind,
    today: NaiveDate,
) -> Result<DueDate, CareError> {
    let history = storage
        .get_activity_history(plant.plant_id, kind, today)
        .await?;
    let profile = catalog.lookup(&plant.scientific_name);

    Ok(next_due_for_plant(plant, &history, profile, kind))
}

/// Build the care summary shown on a plant's detail page.
///
/// # Errors
///
/// `NotFound` if the plant does not exist. An unknown species is not an
/// error: conditions are `None` and both due dates are `Unknown`.
pub async fn plant_care_summary(
    storage: &Storage,
    catalog: &SpeciesCatalog,
    plant_id: i64,
    today: NaiveDate,
) -> Result<CareSummary, CareError> {
    let plant = storage.require_plant(plant_id).await?;

    let (water, fertilizer) = if plant.is_dead {
        (None, None)
    } else {
        let water = due_date_for(storage, catalog, &plant, ActivityKind::Water, today).await?;
        let fertilizer =
            due_date_for(storage, catalog, &plant, ActivityKind::Fertilizer, today).await?;
        (
            Some(DueStatus::new(water, today)),
            Some(DueStatus::new(fertilizer, today)),
        )
    };

    Ok(CareSummary {
        plant_id: plant.plant_id,
        conditions: catalog.ideal_conditions(&plant.scientific_name),
        plant_name: plant.plant_name,
        scientific_name: plant.scientific_name,
        is_dead: plant.is_dead,
        today,
        water,
        fertilizer,
    })
}

/// Every care activity of a user's living plants that is due on or before
/// `today`, most overdue first.
///
/// Histories are fetched as one grouped query per activity kind rather than
/// per plant; the scheduler only needs the latest date of each.
pub async fn due_today(
    storage: &Storage,
    catalog: &SpeciesCatalog,
    user_id: i64,
    today: NaiveDate,
) -> Result<TodoResponse, CareError> {
    let plants = storage.list_plants(user_id).await?;
    let mut last_dates = Vec::with_capacity(ActivityKind::ALL.len());
    for kind in ActivityKind::ALL {
        let dates = storage.last_activity_dates(user_id, kind, today).await?;
        last_dates.push((kind, dates));
    }

    let mut items = Vec::new();
    for plant in plants.iter().filter(|p| !p.is_dead) {
        let profile = catalog.lookup(&plant.scientific_name);
        for (kind, dates) in &last_dates {
            let kind = *kind;
            let history = dates
                .get(&plant.plant_id)
                .map(std::slice::from_ref)
                .unwrap_or_default();
            let due = next_due_for_plant(plant, history, profile, kind);
            if let Some(due_on) = due.date().filter(|_| due.is_due_by(today)) {
                items.push(TodoItem {
                    plant_id: plant.plant_id,
                    plant_name: plant.plant_name.clone(),
                    kind,
                    due_on,
                    overdue: due.is_overdue(today),
                });
            }
        }
    }

    items.sort_by_key(|item| (item.due_on, item.plant_id));

    Ok(TodoResponse {
        user_id,
        today,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpeciesProfile;
    use crate::storage::NewPlant;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn setup() -> (Storage, SpeciesCatalog) {
        let storage = Storage::new("sqlite::memory:").await.unwrap();
        let catalog = SpeciesCatalog::from_profiles([
            SpeciesProfile::new("Spider Plant", 2, 2, 2, 10.0, 25.0).unwrap(),
            SpeciesProfile::new("ZZ Plant", 4, 1, 1, 15.0, 30.0).unwrap(),
        ])
        .unwrap();
        (storage, catalog)
    }

    async fn add_plant(storage: &Storage, name: &str, species: &str) -> Plant {
        storage
            .insert_plant(&NewPlant {
                user_id: 1,
                plant_name: name.to_string(),
                scientific_name: species.to_string(),
                created_on: date("2022-01-01"),
                image: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_summary_after_watering() {
        let (storage, catalog) = setup().await;
        let plant = add_plant(&storage, "Spidey", "Spider Plant").await;
        storage
            .record_activity(plant.plant_id, ActivityKind::Water, date("2022-01-01"))
            .await
            .unwrap();

        let summary = plant_care_summary(&storage, &catalog, plant.plant_id, date("2022-01-02"))
            .await
            .unwrap();

        let water = summary.water.unwrap();
        assert_eq!(water.due, DueDate::Scheduled(date("2022-01-03")));
        assert_eq!(water.days_until, Some(1));
        assert!(!water.overdue);

        let conditions = summary.conditions.unwrap();
        assert_eq!(conditions.light.label(), Some("shade"));
        assert!(conditions.issue.is_none());
    }

    #[tokio::test]
    async fn test_summary_without_history_uses_creation_date() {
        let (storage, catalog) = setup().await;
        let plant = add_plant(&storage, "Zed", "ZZ Plant").await;

        let summary = plant_care_summary(&storage, &catalog, plant.plant_id, date("2022-01-10"))
            .await
            .unwrap();

        let water = summary.water.unwrap();
        assert_eq!(water.due, DueDate::Scheduled(date("2022-01-05")));
        assert!(water.overdue);
        assert_eq!(water.days_until, Some(-5));
    }

    #[tokio::test]
    async fn test_summary_ignores_future_events() {
        let (storage, catalog) = setup().await;
        let plant = add_plant(&storage, "Spidey", "Spider Plant").await;
        for d in ["2022-01-02", "2022-03-01"] {
            storage
                .record_activity(plant.plant_id, ActivityKind::Water, date(d))
                .await
                .unwrap();
        }

        let summary = plant_care_summary(&storage, &catalog, plant.plant_id, date("2022-01-03"))
            .await
            .unwrap();

        assert_eq!(
            summary.water.unwrap().due,
            DueDate::Scheduled(date("2022-01-04"))
        );
    }

    #[tokio::test]
    async fn test_summary_unknown_species() {
        let (storage, catalog) = setup().await;
        let plant = add_plant(&storage, "Mystery", "Plantus unknownus").await;

        let summary = plant_care_summary(&storage, &catalog, plant.plant_id, date("2022-01-03"))
            .await
            .unwrap();

        assert!(summary.conditions.is_none());
        assert_eq!(summary.water.unwrap().due, DueDate::Unknown);
        assert_eq!(summary.fertilizer.unwrap().due, DueDate::Unknown);
    }

    #[tokio::test]
    async fn test_summary_dead_plant_has_no_due_dates() {
        let (storage, catalog) = setup().await;
        let plant = add_plant(&storage, "RIP", "Spider Plant").await;
        storage.mark_dead(plant.plant_id).await.unwrap();

        let summary = plant_care_summary(&storage, &catalog, plant.plant_id, date("2022-01-03"))
            .await
            .unwrap();

        assert!(summary.is_dead);
        assert!(summary.water.is_none());
        assert!(summary.fertilizer.is_none());
        assert!(summary.conditions.is_some());
    }

    #[tokio::test]
    async fn test_summary_missing_plant() {
        let (storage, catalog) = setup().await;

        let err = plant_care_summary(&storage, &catalog, 404, date("2022-01-03"))
            .await
            .unwrap_err();

        assert!(matches!(err, CareError::NotFound { entity: "plant", .. }));
    }

    #[tokio::test]
    async fn test_due_today_lists_due_and_overdue() {
        let (storage, catalog) = setup().await;
        let spidey = add_plant(&storage, "Spidey", "Spider Plant").await;
        let zed = add_plant(&storage, "Zed", "ZZ Plant").await;
        let dead = add_plant(&storage, "RIP", "Spider Plant").await;
        add_plant(&storage, "Mystery", "Plantus unknownus").await;
        storage.mark_dead(dead.plant_id).await.unwrap();

        // Spider Plant: water + fertilizer due 2022-01-03. ZZ: water 01-05, fertilizer 01-02.
        let todo = due_today(&storage, &catalog, 1, date("2022-01-03")).await.unwrap();

        let entries: Vec<_> = todo
            .items
            .iter()
            .map(|i| (i.plant_id, i.kind, i.due_on, i.overdue))
            .collect();
        assert_eq!(
            entries,
            vec![
                (zed.plant_id, ActivityKind::Fertilizer, date("2022-01-02"), true),
                (spidey.plant_id, ActivityKind::Water, date("2022-01-03"), false),
                (spidey.plant_id, ActivityKind::Fertilizer, date("2022-01-03"), false),
            ]
        );
    }

    #[tokio::test]
    async fn test_due_today_uses_latest_event_per_plant() {
        let (storage, catalog) = setup().await;
        let spidey = add_plant(&storage, "Spidey", "Spider Plant").await;
        let zed = add_plant(&storage, "Zed", "ZZ Plant").await;
        for d in ["2022-01-02", "2022-01-04", "2022-01-09"] {
            storage
                .record_activity(spidey.plant_id, ActivityKind::Water, date(d))
                .await
                .unwrap();
        }
        storage
            .record_activity(zed.plant_id, ActivityKind::Fertilizer, date("2022-01-05"))
            .await
            .unwrap();

        // Spidey water: 01-04 + 2 (01-09 is after today). Zed water 01-05, fertilizer 01-06.
        let todo = due_today(&storage, &catalog, 1, date("2022-01-06")).await.unwrap();

        let entries: Vec<_> = todo
            .items
            .iter()
            .map(|i| (i.plant_id, i.kind, i.due_on))
            .collect();
        assert_eq!(
            entries,
            vec![
                (spidey.plant_id, ActivityKind::Fertilizer, date("2022-01-03")),
                (zed.plant_id, ActivityKind::Water, date("2022-01-05")),
                (spidey.plant_id, ActivityKind::Water, date("2022-01-06")),
                (zed.plant_id, ActivityKind::Fertilizer, date("2022-01-06")),
            ]
        );
    }

    #[tokio::test]
    async fn test_due_today_empty_for_other_user() {
        let (storage, catalog) = setup().await;
        add_plant(&storage, "Spidey", "Spider Plant").await;

        let todo = due_today(&storage, &catalog, 2, date("2030-01-01")).await.unwrap();
        assert!(todo.items.is_empty());
        assert_eq!(todo.user_id, 2);
    }
}
