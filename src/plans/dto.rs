use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::model::{DayPlan, DietPlan, GenerationModel, Meal, MealStatus, NutritionProfile};
use super::status::MealStatusUpdate;
use super::variants::{self, VariantSummary};

/// Incoming day entry. Dates are calendar days by construction, and any
/// client-supplied completion percentage is ignored; it is recomputed
/// before the plan is persisted or returned.
#[derive(Debug, Clone, Deserialize)]
pub struct DayPlanInput {
    pub date: Date,
    pub meals: Vec<MealInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MealInput {
    pub food_id: Uuid,
    #[serde(default)]
    pub status: MealStatus,
}

impl From<DayPlanInput> for DayPlan {
    fn from(input: DayPlanInput) -> Self {
        DayPlan {
            date: input.date,
            meals: input
                .meals
                .into_iter()
                .map(|m| Meal {
                    food_id: m.food_id,
                    status: m.status,
                })
                .collect(),
            percentage_of_completions: 0.0,
        }
    }
}

pub(crate) fn into_day_plans(inputs: Vec<DayPlanInput>) -> Vec<DayPlan> {
    inputs.into_iter().map(DayPlan::from).collect()
}

#[derive(Debug, Deserialize)]
pub struct CreateDietPlanRequest {
    pub nutritions_per_day: NutritionProfile,
    #[serde(default)]
    pub plan: Vec<DayPlanInput>,
}

#[derive(Debug, Deserialize)]
pub struct VariantUpdateRequest {
    pub model: GenerationModel,
    pub plan: Vec<DayPlanInput>,
}

/// Partial update. At least one field must be present.
#[derive(Debug, Deserialize)]
pub struct UpdateDietPlanRequest {
    #[serde(default)]
    pub day_plans: Option<Vec<DayPlanInput>>,
    #[serde(default)]
    pub variant: Option<VariantUpdateRequest>,
    #[serde(default)]
    pub active_model: Option<GenerationModel>,
}

/// Domain-level form of `UpdateDietPlanRequest`, also produced internally
/// by the regeneration flow.
#[derive(Debug, Default)]
pub struct PlanUpdate {
    pub day_plans: Option<Vec<DayPlan>>,
    pub variant: Option<(GenerationModel, Vec<DayPlan>)>,
    pub active_model: Option<GenerationModel>,
}

impl PlanUpdate {
    pub fn is_empty(&self) -> bool {
        self.day_plans.is_none() && self.variant.is_none() && self.active_model.is_none()
    }
}

impl From<UpdateDietPlanRequest> for PlanUpdate {
    fn from(req: UpdateDietPlanRequest) -> Self {
        PlanUpdate {
            day_plans: req.day_plans.map(into_day_plans),
            variant: req
                .variant
                .map(|v| (v.model, into_day_plans(v.plan))),
            active_model: req.active_model,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MealStatusRequest {
    pub date: Date,
    pub food_id: Uuid,
    pub status: MealStatus,
}

impl From<MealStatusRequest> for MealStatusUpdate {
    fn from(req: MealStatusRequest) -> Self {
        MealStatusUpdate {
            date: req.date,
            food_id: req.food_id,
            status: req.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchMealStatusRequest {
    pub updates: Vec<MealStatusRequest>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateVariantRequest {
    pub model: GenerationModel,
    pub days: u16,
}

#[derive(Debug, Deserialize)]
pub struct RemainingDaysQuery {
    pub total_days: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub on_day: Option<Date>,
}

/// Full plan representation returned by every plan endpoint. `plan` is the
/// canonical sequence; `active_plan` is what the client should render.
#[derive(Debug, Serialize)]
pub struct DietPlanResponse {
    pub id: Uuid,
    pub nutritions_per_day: NutritionProfile,
    pub active_model: Option<GenerationModel>,
    pub plan: Vec<DayPlan>,
    pub active_plan: Vec<DayPlan>,
    pub variants: Vec<VariantSummary>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<DietPlan> for DietPlanResponse {
    fn from(plan: DietPlan) -> Self {
        let summaries = variants::variant_summaries(&plan);
        let active_plan = variants::active_plan(&plan).to_vec();
        DietPlanResponse {
            id: plan.id,
            nutritions_per_day: plan.nutritions_per_day,
            active_model: plan.active_model,
            plan: plan.plan,
            active_plan,
            variants: summaries,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RemainingDaysResponse {
    pub remaining_days: i64,
}
