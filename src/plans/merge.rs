use time::Date;

use super::model::DayPlan;

/// Plain update merge: every incoming day replaces the existing day with
/// the same date wholesale; days only present in the existing sequence are
/// untouched; unmatched incoming days are appended. The result is sorted
/// ascending by date and holds at most one entry per date.
///
/// The surrounding read-modify-write has no version check, so two
/// concurrent merges on the same plan are last-write-wins.
pub fn merge_day_plans(existing: Vec<DayPlan>, incoming: Vec<DayPlan>) -> Vec<DayPlan> {
    let mut merged = existing;
    for day in incoming {
        match merged.iter().position(|d| d.date == day.date) {
            Some(i) => merged[i] = day,
            None => merged.push(day),
        }
    }
    merged.sort_by_key(|d| d.date);
    merged
}

/// Regeneration merge: existing days dated strictly before `today` are
/// history and survive unchanged; everything on or after `today` is
/// speculative and replaced wholesale by the generated sequence. Generated
/// entries dated in the past are dropped so the per-date uniqueness of the
/// preserved history cannot be violated.
pub fn merge_regenerated(
    existing: Vec<DayPlan>,
    generated: Vec<DayPlan>,
    today: Date,
) -> Vec<DayPlan> {
    let mut merged: Vec<DayPlan> = existing.into_iter().filter(|d| d.date < today).collect();
    merged.extend(generated.into_iter().filter(|d| d.date >= today));
    merged.sort_by_key(|d| d.date);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::model::{Meal, MealStatus};
    use time::macros::date;
    use uuid::Uuid;

    fn day(date: Date, foods: &[Uuid]) -> DayPlan {
        DayPlan {
            date,
            meals: foods
                .iter()
                .map(|&food_id| Meal {
                    food_id,
                    status: MealStatus::NotCompleted,
                })
                .collect(),
            percentage_of_completions: 0.0,
        }
    }

    #[test]
    fn overlapping_date_is_replaced_wholesale() {
        let old_food = Uuid::new_v4();
        let new_food = Uuid::new_v4();
        let existing = vec![day(date!(2025 - 03 - 01), &[old_food])];
        let incoming = vec![day(date!(2025 - 03 - 01), &[new_food])];

        let merged = merge_day_plans(existing, incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].meals.len(), 1);
        assert_eq!(merged[0].meals[0].food_id, new_food);
    }

    #[test]
    fn untouched_days_survive_and_order_is_ascending() {
        let f = Uuid::new_v4();
        let existing = vec![
            day(date!(2025 - 03 - 01), &[f]),
            day(date!(2025 - 03 - 03), &[f]),
        ];
        let incoming = vec![day(date!(2025 - 03 - 02), &[f])];

        let merged = merge_day_plans(existing, incoming);
        let dates: Vec<Date> = merged.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2025 - 03 - 01),
                date!(2025 - 03 - 02),
                date!(2025 - 03 - 03)
            ]
        );
    }

    #[test]
    fn duplicate_dates_in_incoming_collapse_to_last() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let incoming = vec![
            day(date!(2025 - 03 - 01), &[first]),
            day(date!(2025 - 03 - 01), &[second]),
        ];
        let merged = merge_day_plans(Vec::new(), incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].meals[0].food_id, second);
    }

    #[test]
    fn regeneration_preserves_past_and_replaces_future() {
        // Scenario: one past-dated entry, one future-dated entry, variant
        // covers only future dates.
        let today = date!(2025 - 03 - 10);
        let past_food = Uuid::new_v4();
        let generated_food = Uuid::new_v4();
        let existing = vec![
            day(date!(2025 - 03 - 09), &[past_food]),
            day(date!(2025 - 03 - 11), &[Uuid::new_v4()]),
        ];
        let generated = vec![
            day(date!(2025 - 03 - 11), &[generated_food]),
            day(date!(2025 - 03 - 12), &[generated_food]),
        ];

        let merged = merge_regenerated(existing, generated, today);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].date, date!(2025 - 03 - 09));
        assert_eq!(merged[0].meals[0].food_id, past_food);
        assert_eq!(merged[1].meals[0].food_id, generated_food);
        assert_eq!(merged[2].date, date!(2025 - 03 - 12));
    }

    #[test]
    fn regeneration_discards_today_and_later_without_replacement() {
        let today = date!(2025 - 03 - 10);
        let existing = vec![
            day(date!(2025 - 03 - 10), &[Uuid::new_v4()]),
            day(date!(2025 - 03 - 15), &[Uuid::new_v4()]),
        ];
        let merged = merge_regenerated(existing, Vec::new(), today);
        assert!(merged.is_empty());
    }

    #[test]
    fn regeneration_drops_past_dated_generated_entries() {
        let today = date!(2025 - 03 - 10);
        let past_food = Uuid::new_v4();
        let existing = vec![day(date!(2025 - 03 - 09), &[past_food])];
        let generated = vec![
            day(date!(2025 - 03 - 09), &[Uuid::new_v4()]),
            day(date!(2025 - 03 - 10), &[Uuid::new_v4()]),
        ];

        let merged = merge_regenerated(existing, generated, today);
        assert_eq!(merged.len(), 2);
        // The preserved past entry wins over the past-dated generated one.
        assert_eq!(merged[0].meals[0].food_id, past_food);
    }
}
