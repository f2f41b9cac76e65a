use time::Date;
use uuid::Uuid;

use super::model::{DayPlan, MealStatus};

/// One requested status change, addressed by calendar date and food id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealStatusUpdate {
    pub date: Date,
    pub food_id: Uuid,
    pub status: MealStatus,
}

impl MealStatusUpdate {
    fn key(&self) -> String {
        format!("{}:{}", self.date, self.food_id)
    }
}

/// Applies a batch of status updates to a day-plan sequence,
/// all-or-nothing: every tuple is located first, and a single miss fails
/// the whole batch with the full list of unmatched `date:food_id` keys
/// before anything is mutated. On success, returns how many meals actually
/// changed status; tuples whose status already matched count as no-ops.
pub fn apply_status_updates(
    days: &mut [DayPlan],
    updates: &[MealStatusUpdate],
) -> Result<usize, Vec<String>> {
    let mut targets = Vec::with_capacity(updates.len());
    let mut missing = Vec::new();

    for update in updates {
        let found = days.iter().position(|d| d.date == update.date).and_then(|di| {
            days[di]
                .meals
                .iter()
                .position(|m| m.food_id == update.food_id)
                .map(|mi| (di, mi))
        });
        match found {
            Some(target) => targets.push((target, update.status)),
            None => missing.push(update.key()),
        }
    }

    if !missing.is_empty() {
        return Err(missing);
    }

    let mut changed = 0;
    for ((di, mi), status) in targets {
        let meal = &mut days[di].meals[mi];
        if meal.status != status {
            meal.status = status;
            changed += 1;
        }
    }
    Ok(changed)
}
