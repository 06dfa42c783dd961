//! Care scheduling.
//!
//! Pure date arithmetic: the next due date of an activity is the most recent
//! event of that kind (or the plant's creation date when there is none) plus
//! the species' interval for it. Nothing in here reads the clock, touches
//! storage, or logs; "today" is always a parameter.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::model::{ActivityKind, Plant, SpeciesProfile};

/// The computed next occurrence of a care activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "date", rename_all = "snake_case")]
pub enum DueDate {
    /// Due on this date. May be in the past; callers render overdue state.
    Scheduled(NaiveDate),
    /// The species is unknown, so no interval applies.
    Unknown,
}

impl DueDate {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            DueDate::Scheduled(date) => Some(date),
            DueDate::Unknown => None,
        }
    }

    /// Days from `today` until the due date; negative when overdue.
    pub fn days_until(self, today: NaiveDate) -> Option<i64> {
        self.date().map(|due| (due - today).num_days())
    }

    /// True if the due date is strictly before `today`.
    pub fn is_overdue(self, today: NaiveDate) -> bool {
        self.date().is_some_and(|due| due < today)
    }

    /// True if the activity should happen on or before `today`.
    pub fn is_due_by(self, today: NaiveDate) -> bool {
        self.date().is_some_and(|due| due <= today)
    }
}

/// Compute the next due date for one activity kind.
///
/// # Arguments
///
/// * `created_on` - The plant's creation date, used when `history` is empty
/// * `history` - Dates of past events of this kind, in any order
/// * `profile` - The species profile, or `None` if the species is unknown
/// * `kind` - Which interval of the profile to apply
///
/// # Returns
///
/// `Scheduled(last + interval)` where `last` is the maximum date in `history`,
/// or `Unknown` when there is no profile. A date past chrono's range is also
/// reported as `Unknown`.
pub fn next_due_date(
    created_on: NaiveDate,
    history: &[NaiveDate],
    profile: Option<&SpeciesProfile>,
    kind: ActivityKind,
) -> DueDate {
    let Some(profile) = profile else {
        return DueDate::Unknown;
    };

    let last = history.iter().copied().max().unwrap_or(created_on);
    let interval = Days::new(u64::from(profile.interval_days(kind)));

    last.checked_add_days(interval)
        .map_or(DueDate::Unknown, DueDate::Scheduled)
}

/// [`next_due_date`] for a stored plant.
pub fn next_due_for_plant(
    plant: &Plant,
    history: &[NaiveDate],
    profile: Option<&SpeciesProfile>,
    kind: ActivityKind,
) -> DueDate {
    next_due_date(plant.created_on, history, profile, kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn profile(water: i64, fertilizer: i64) -> SpeciesProfile {
        SpeciesProfile::new("Testus plantus", water, fertilizer, 3, 15.0, 25.0).unwrap()
    }

    #[test]
    fn test_due_after_last_watering() {
        let p = profile(2, 30);
        let due = next_due_date(
            date("2021-12-01"),
            &[date("2022-01-01")],
            Some(&p),
            ActivityKind::Water,
        );
        assert_eq!(due, DueDate::Scheduled(date("2022-01-03")));
    }

    #[test]
    fn test_empty_history_falls_back_to_creation() {
        let p = profile(4, 30);
        let due = next_due_date(date("2022-01-01"), &[], Some(&p), ActivityKind::Water);
        assert_eq!(due, DueDate::Scheduled(date("2022-01-05")));
    }

    #[test]
    fn test_unknown_species() {
        let due = next_due_date(
            date("2022-01-01"),
            &[date("2022-01-02")],
            None,
            ActivityKind::Water,
        );
        assert_eq!(due, DueDate::Unknown);
        assert_eq!(due.days_until(date("2022-01-02")), None);
        assert!(!due.is_overdue(date("2030-01-01")));
    }

    #[test]
    fn test_unsorted_history_uses_maximum() {
        let p = profile(1, 30);
        let history = [date("2022-01-03"), date("2022-01-01"), date("2022-01-02")];
        let due = next_due_date(date("2021-06-01"), &history, Some(&p), ActivityKind::Water);
        assert_eq!(due, DueDate::Scheduled(date("2022-01-04")));
    }

    #[test]
    fn test_permutation_invariance() {
        let p = profile(3, 30);
        let created = date("2021-06-01");
        let base = [
            date("2022-02-10"),
            date("2022-01-01"),
            date("2022-02-11"),
            date("2022-01-15"),
        ];
        let expected = DueDate::Scheduled(date("2022-02-14"));

        let mut history = base.to_vec();
        for _ in 0..history.len() {
            history.rotate_left(1);
            assert_eq!(
                next_due_date(created, &history, Some(&p), ActivityKind::Water),
                expected
            );
            history.reverse();
            assert_eq!(
                next_due_date(created, &history, Some(&p), ActivityKind::Water),
                expected
            );
        }
    }

    #[test]
    fn test_duplicate_dates_count_once() {
        let p = profile(2, 30);
        let history = [date("2022-01-05"), date("2022-01-05")];
        let due = next_due_date(date("2022-01-01"), &history, Some(&p), ActivityKind::Water);
        assert_eq!(due, DueDate::Scheduled(date("2022-01-07")));
    }

    #[test]
    fn test_idempotent() {
        let p = profile(5, 10);
        let created = date("2022-01-01");
        let history = [date("2022-03-01")];
        let first = next_due_date(created, &history, Some(&p), ActivityKind::Fertilizer);
        let second = next_due_date(created, &history, Some(&p), ActivityKind::Fertilizer);
        assert_eq!(first, second);
        assert_eq!(first, DueDate::Scheduled(date("2022-03-11")));
    }

    #[test]
    fn test_past_due_is_not_clamped() {
        let p = profile(2, 30);
        let due = next_due_date(date("2022-01-01"), &[], Some(&p), ActivityKind::Water);
        let today = date("2022-02-01");

        assert_eq!(due, DueDate::Scheduled(date("2022-01-03")));
        assert!(due.is_overdue(today));
        assert!(due.is_due_by(today));
        assert_eq!(due.days_until(today), Some(-29));
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let due = DueDate::Scheduled(date("2022-01-03"));
        assert!(!due.is_overdue(date("2022-01-03")));
        assert!(due.is_due_by(date("2022-01-03")));
        assert_eq!(due.days_until(date("2022-01-01")), Some(2));
    }

    #[test]
    fn test_kind_selects_interval() {
        let p = profile(2, 14);
        let created = date("2022-01-01");
        assert_eq!(
            next_due_date(created, &[], Some(&p), ActivityKind::Fertilizer),
            DueDate::Scheduled(date("2022-01-15"))
        );
        assert_eq!(
            next_due_date(created, &[], Some(&p), ActivityKind::Water),
            DueDate::Scheduled(date("2022-01-03"))
        );
    }

    #[test]
    fn test_overflow_is_unknown() {
        let p = profile(30, 30);
        let due = next_due_date(NaiveDate::MAX, &[], Some(&p), ActivityKind::Water);
        assert_eq!(due, DueDate::Unknown);
    }

    #[test]
    fn test_due_date_serialization() {
        let json = serde_json::to_value(DueDate::Scheduled(date("2022-01-03"))).unwrap();
        assert_eq!(json["state"], "scheduled");
        assert_eq!(json["date"], "2022-01-03");

        let json = serde_json::to_value(DueDate::Unknown).unwrap();
        assert_eq!(json["state"], "unknown");
    }
}
