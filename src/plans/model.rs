use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// The nine nutrient channels tracked per food and per daily target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NutritionProfile {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugars: f64,
    #[serde(default)]
    pub sodium: f64,
    #[serde(default)]
    pub cholesterol: f64,
    #[serde(default)]
    pub water_intake: f64,
}

impl NutritionProfile {
    pub const CHANNELS: usize = 9;

    pub fn channels(&self) -> [f64; Self::CHANNELS] {
        [
            self.calories,
            self.protein,
            self.carbohydrates,
            self.fat,
            self.fiber,
            self.sugars,
            self.sodium,
            self.cholesterol,
            self.water_intake,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealStatus {
    #[default]
    NotCompleted,
    Completed,
}

/// A single meal selection; foods are referenced by id, never embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub food_id: Uuid,
    pub status: MealStatus,
}

/// One calendar day of the plan. `percentage_of_completions` is derived
/// and recomputed before every persist or read-back; incoming values are
/// never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: Date,
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub percentage_of_completions: f64,
}

/// Tag identifying which generation source produced a plan variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationModel {
    Gemma,
    Flash,
}

impl GenerationModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationModel::Gemma => "gemma",
            GenerationModel::Flash => "flash",
        }
    }
}

impl fmt::Display for GenerationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemma" => Ok(GenerationModel::Gemma),
            "flash" => Ok(GenerationModel::Flash),
            other => Err(format!("unknown generation model: {other}")),
        }
    }
}

/// An alternate day-plan sequence produced by one generation source.
/// At most one variant per model tag is kept (upsert semantics).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanVariant {
    pub model: GenerationModel,
    pub plan: Vec<DayPlan>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The diet plan aggregate. All fields are read and rewritten together on
/// every mutation; there is no optimistic version check, so concurrent
/// writers to the same id race last-write-wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietPlan {
    pub id: Uuid,
    pub nutritions_per_day: NutritionProfile,
    /// Active-variant tag; `None` means the canonical plan is active
    /// unless variants exist (see `variants::active_plan`).
    pub active_model: Option<GenerationModel>,
    pub plan: Vec<DayPlan>,
    pub variants: Vec<PlanVariant>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
