use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use super::model::{DayPlan, DietPlan, Meal, MealStatus, NutritionProfile};

/// Completion percentage for one day's meals.
///
/// Sums every nutrient channel across all meals ("total") and across
/// completed meals, then averages completed/total over the channels with a
/// positive total. A day with no meals, or whose meals reference only
/// unknown foods, scores 0. Unknown food ids contribute nothing to either
/// sum; the miss is logged so a stale catalog does not silently skew the
/// number.
pub fn day_completion(meals: &[Meal], foods: &HashMap<Uuid, NutritionProfile>) -> f64 {
    if meals.is_empty() {
        return 0.0;
    }

    let mut total = [0.0_f64; NutritionProfile::CHANNELS];
    let mut completed = [0.0_f64; NutritionProfile::CHANNELS];

    for meal in meals {
        let Some(nutrition) = foods.get(&meal.food_id) else {
            warn!(food_id = %meal.food_id, "food missing from catalog, excluded from completion");
            continue;
        };
        let channels = nutrition.channels();
        for (i, value) in channels.iter().enumerate() {
            total[i] += value;
            if meal.status == MealStatus::Completed {
                completed[i] += value;
            }
        }
    }

    let mut percentage_sum = 0.0;
    let mut count = 0u32;
    for i in 0..NutritionProfile::CHANNELS {
        if total[i] > 0.0 {
            percentage_sum += completed[i] / total[i] * 100.0;
            count += 1;
        }
    }

    if count == 0 {
        0.0
    } else {
        round2(percentage_sum / f64::from(count))
    }
}

/// Recomputes `percentage_of_completions` for every day in a sequence.
pub fn recalculate_plan(days: &mut [DayPlan], foods: &HashMap<Uuid, NutritionProfile>) {
    for day in days {
        day.percentage_of_completions = day_completion(&day.meals, foods);
    }
}

/// Recomputes derived percentages across the canonical plan and every
/// variant, so no stale figure survives a mutation or a read.
pub fn recalculate_all(plan: &mut DietPlan, foods: &HashMap<Uuid, NutritionProfile>) {
    recalculate_plan(&mut plan.plan, foods);
    for variant in &mut plan.variants {
        recalculate_plan(&mut variant.plan, foods);
    }
}

/// Distinct food ids referenced anywhere in the aggregate, for one batch
/// catalog lookup.
pub fn collect_food_ids(plan: &DietPlan) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = plan
        .plan
        .iter()
        .chain(plan.variants.iter().flat_map(|v| v.plan.iter()))
        .flat_map(|day| day.meals.iter().map(|m| m.food_id))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::model::MealStatus;
    use time::macros::date;

    fn profile(calories: f64, protein: f64) -> NutritionProfile {
        NutritionProfile {
            calories,
            protein,
            ..Default::default()
        }
    }

    fn meal(food_id: Uuid, status: MealStatus) -> Meal {
        Meal { food_id, status }
    }

    #[test]
    fn empty_day_scores_zero() {
        assert_eq!(day_completion(&[], &HashMap::new()), 0.0);
    }

    #[test]
    fn single_completed_meal_scores_hundred() {
        // Scenario: one food with calories=200, protein=10, rest zero.
        let f1 = Uuid::new_v4();
        let foods = HashMap::from([(f1, profile(200.0, 10.0))]);
        let meals = vec![meal(f1, MealStatus::Completed)];
        assert_eq!(day_completion(&meals, &foods), 100.0);
    }

    #[test]
    fn half_completed_identical_foods_score_fifty() {
        let f1 = Uuid::new_v4();
        let f2 = Uuid::new_v4();
        let foods = HashMap::from([(f1, profile(300.0, 0.0)), (f2, profile(300.0, 0.0))]);
        let meals = vec![
            meal(f1, MealStatus::Completed),
            meal(f2, MealStatus::NotCompleted),
        ];
        assert_eq!(day_completion(&meals, &foods), 50.0);
    }

    #[test]
    fn all_completed_scores_hundred_across_channels() {
        let f1 = Uuid::new_v4();
        let f2 = Uuid::new_v4();
        let foods = HashMap::from([
            (
                f1,
                NutritionProfile {
                    calories: 120.0,
                    fat: 4.5,
                    sodium: 80.0,
                    ..Default::default()
                },
            ),
            (f2, profile(250.0, 18.0)),
        ]);
        let meals = vec![meal(f1, MealStatus::Completed), meal(f2, MealStatus::Completed)];
        assert_eq!(day_completion(&meals, &foods), 100.0);
    }

    #[test]
    fn unknown_food_contributes_nothing() {
        let known = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let foods = HashMap::from([(known, profile(100.0, 0.0))]);
        let meals = vec![
            meal(known, MealStatus::Completed),
            meal(unknown, MealStatus::NotCompleted),
        ];
        // The unknown meal is excluded entirely, so the known one is 100%.
        assert_eq!(day_completion(&meals, &foods), 100.0);
    }

    #[test]
    fn only_unknown_foods_score_zero() {
        let meals = vec![meal(Uuid::new_v4(), MealStatus::Completed)];
        assert_eq!(day_completion(&meals, &HashMap::new()), 0.0);
    }

    #[test]
    fn result_is_rounded_to_two_decimals() {
        let f1 = Uuid::new_v4();
        let f2 = Uuid::new_v4();
        let f3 = Uuid::new_v4();
        let foods = HashMap::from([
            (f1, profile(100.0, 0.0)),
            (f2, profile(100.0, 0.0)),
            (f3, profile(100.0, 0.0)),
        ]);
        let meals = vec![
            meal(f1, MealStatus::Completed),
            meal(f2, MealStatus::NotCompleted),
            meal(f3, MealStatus::NotCompleted),
        ];
        // 1/3 of the calories completed -> 33.333... -> 33.33
        assert_eq!(day_completion(&meals, &foods), 33.33);
    }

    #[test]
    fn recalculate_plan_overwrites_stale_percentages() {
        let f1 = Uuid::new_v4();
        let foods = HashMap::from([(f1, profile(200.0, 10.0))]);
        let mut days = vec![DayPlan {
            date: date!(2025 - 03 - 01),
            meals: vec![meal(f1, MealStatus::Completed)],
            percentage_of_completions: 7.0, // caller-supplied garbage
        }];
        recalculate_plan(&mut days, &foods);
        assert_eq!(days[0].percentage_of_completions, 100.0);
    }

    #[test]
    fn collect_food_ids_spans_variants_and_dedupes() {
        use crate::plans::model::{DietPlan, PlanVariant};
        let f1 = Uuid::new_v4();
        let f2 = Uuid::new_v4();
        let day = |food| DayPlan {
            date: date!(2025 - 03 - 01),
            meals: vec![meal(food, MealStatus::NotCompleted)],
            percentage_of_completions: 0.0,
        };
        let plan = DietPlan {
            id: Uuid::new_v4(),
            nutritions_per_day: NutritionProfile::default(),
            active_model: None,
            plan: vec![day(f1)],
            variants: vec![PlanVariant {
                model: crate::plans::model::GenerationModel::Gemma,
                plan: vec![day(f1), day(f2)],
                created_at: time::OffsetDateTime::now_utc(),
            }],
            created_at: time::OffsetDateTime::now_utc(),
            updated_at: time::OffsetDateTime::now_utc(),
        };
        let ids = collect_food_ids(&plan);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&f1) && ids.contains(&f2));
    }
}
