use time::{Date, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::generation::GenerationRequest;
use crate::state::AppState;

use super::cache_sync;
use super::dto::{CreateDietPlanRequest, PlanUpdate};
use super::merge;
use super::model::{DietPlan, GenerationModel, PlanVariant};
use super::nutrition;
use super::status::{self, MealStatusUpdate};
use super::variants::{self, VariantSummary};

/// Recomputes every derived completion percentage from the current
/// catalog data. Runs before any persist and before any read-back, so a
/// stale or caller-supplied figure never leaves this module.
pub(crate) async fn recompute(state: &AppState, plan: &mut DietPlan) -> Result<(), ApiError> {
    let ids = nutrition::collect_food_ids(plan);
    let foods = state
        .catalog
        .find_nutrition(&ids)
        .await
        .map_err(ApiError::Dependency)?;
    nutrition::recalculate_all(plan, &foods);
    Ok(())
}

async fn fetch(state: &AppState, id: Uuid) -> Result<DietPlan, ApiError> {
    state
        .store
        .find_by_id(id)
        .await?
        .ok_or(ApiError::PlanNotFound(id))
}

async fn persist_update(state: &AppState, plan: &DietPlan) -> Result<(), ApiError> {
    if !state.store.update(plan).await? {
        // Deleted between our read and this write.
        return Err(ApiError::PlanNotFound(plan.id));
    }
    Ok(())
}

pub async fn create_diet_plan(
    state: &AppState,
    actor: Uuid,
    req: CreateDietPlanRequest,
) -> Result<DietPlan, ApiError> {
    let now = OffsetDateTime::now_utc();
    let days = super::dto::into_day_plans(req.plan);
    let mut plan = DietPlan {
        id: Uuid::new_v4(),
        nutritions_per_day: req.nutritions_per_day,
        active_model: None,
        // The merge against an empty sequence dedupes dates and sorts.
        plan: merge::merge_day_plans(Vec::new(), days),
        variants: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    recompute(state, &mut plan).await?;
    state.store.create(&plan).await?;
    info!(actor = %actor, plan_id = %plan.id, days = plan.plan.len(), "diet plan created");

    cache_sync::propagate_plan_update(state.users.as_ref(), &state.cache, &plan).await;
    Ok(plan)
}

pub async fn get_diet_plan(state: &AppState, id: Uuid) -> Result<DietPlan, ApiError> {
    let mut plan = fetch(state, id).await?;
    recompute(state, &mut plan).await?;
    Ok(plan)
}

/// All plans, or only those containing an entry for `on_day`.
pub async fn list_diet_plans(
    state: &AppState,
    on_day: Option<Date>,
) -> Result<Vec<DietPlan>, ApiError> {
    let mut plans = match on_day {
        Some(day) => state.store.find_by_day(day).await?,
        None => state.store.list().await?,
    };
    for plan in &mut plans {
        recompute(state, plan).await?;
    }
    Ok(plans)
}

pub async fn update_diet_plan(
    state: &AppState,
    actor: Uuid,
    id: Uuid,
    update: PlanUpdate,
) -> Result<DietPlan, ApiError> {
    if update.is_empty() {
        return Err(ApiError::validation(
            "update must include day_plans, variant, or active_model",
        ));
    }

    let mut plan = fetch(state, id).await?;
    let now = OffsetDateTime::now_utc();

    if let Some((model, generated)) = update.variant {
        // Regeneration path: history before today survives, everything
        // on/after today comes from the fresh generation. The merged
        // sequence becomes the variant's plan and that tag goes active.
        let merged = merge::merge_regenerated(plan.plan.clone(), generated, now.date());
        variants::upsert_variant(
            &mut plan.variants,
            PlanVariant {
                model,
                plan: merged,
                created_at: now,
            },
        );
        plan.active_model = Some(model);
    }

    if let Some(incoming) = update.day_plans {
        plan.plan = merge::merge_day_plans(std::mem::take(&mut plan.plan), incoming);
    }

    if let Some(tag) = update.active_model {
        if !plan.variants.iter().any(|v| v.model == tag) {
            return Err(ApiError::validation(format!("no variant tagged {tag}")));
        }
        plan.active_model = Some(tag);
    }

    plan.updated_at = now;
    recompute(state, &mut plan).await?;
    persist_update(state, &plan).await?;
    info!(actor = %actor, plan_id = %id, "diet plan updated");

    cache_sync::propagate_plan_update(state.users.as_ref(), &state.cache, &plan).await;
    Ok(plan)
}

pub async fn delete_diet_plan(
    state: &AppState,
    actor: Uuid,
    id: Uuid,
) -> Result<DietPlan, ApiError> {
    let deleted = state
        .store
        .delete(id)
        .await?
        .ok_or(ApiError::PlanNotFound(id))?;
    info!(actor = %actor, plan_id = %id, "diet plan deleted");

    cache_sync::propagate_plan_removal(state.users.as_ref(), &state.cache, id).await;
    Ok(deleted)
}

pub async fn update_meal_status(
    state: &AppState,
    actor: Uuid,
    id: Uuid,
    update: MealStatusUpdate,
) -> Result<DietPlan, ApiError> {
    update_meal_status_batch(state, actor, id, vec![update]).await
}

/// Applies a batch of status changes against the active sequence,
/// all-or-nothing, then recomputes and persists the whole document once.
/// A batch that changes nothing skips persistence entirely.
pub async fn update_meal_status_batch(
    state: &AppState,
    actor: Uuid,
    id: Uuid,
    updates: Vec<MealStatusUpdate>,
) -> Result<DietPlan, ApiError> {
    if updates.is_empty() {
        return Err(ApiError::validation("no meal status updates provided"));
    }

    let mut plan = fetch(state, id).await?;
    let changed = status::apply_status_updates(variants::active_plan_mut(&mut plan), &updates)
        .map_err(ApiError::MealsNotFound)?;

    recompute(state, &mut plan).await?;
    if changed > 0 {
        plan.updated_at = OffsetDateTime::now_utc();
        persist_update(state, &plan).await?;
        info!(actor = %actor, plan_id = %id, changed, "meal statuses updated");
        cache_sync::propagate_plan_update(state.users.as_ref(), &state.cache, &plan).await;
    }
    Ok(plan)
}

pub async fn list_variants(state: &AppState, id: Uuid) -> Result<Vec<VariantSummary>, ApiError> {
    let plan = fetch(state, id).await?;
    Ok(variants::variant_summaries(&plan))
}

pub async fn remove_variant(
    state: &AppState,
    actor: Uuid,
    id: Uuid,
    model: GenerationModel,
) -> Result<DietPlan, ApiError> {
    let mut plan = fetch(state, id).await?;
    if variants::remove_variant(&mut plan.variants, model) {
        if plan.active_model == Some(model) {
            plan.active_model = None;
        }
        plan.updated_at = OffsetDateTime::now_utc();
        recompute(state, &mut plan).await?;
        persist_update(state, &plan).await?;
        info!(actor = %actor, plan_id = %id, model = %model, "variant removed");
        cache_sync::propagate_plan_update(state.users.as_ref(), &state.cache, &plan).await;
    }
    Ok(plan)
}

/// Calls the generation collaborator and registers the result as a
/// variant via the regular update path. A collaborator failure surfaces
/// as a retryable dependency error and leaves the stored plan untouched.
pub async fn regenerate_plan(
    state: &AppState,
    actor: Uuid,
    id: Uuid,
    model: GenerationModel,
    days: u16,
) -> Result<DietPlan, ApiError> {
    let max_days = state.config.generation.max_plan_days;
    if days == 0 || days > max_days {
        return Err(ApiError::validation(format!(
            "requested day count must be between 1 and {max_days}"
        )));
    }

    let plan = fetch(state, id).await?;
    let foods = state.catalog.list().await.map_err(ApiError::Dependency)?;
    let request = GenerationRequest {
        model,
        nutritions_per_day: plan.nutritions_per_day.clone(),
        foods,
        days,
    };
    let generated = state
        .generator
        .generate(&request)
        .await
        .map_err(ApiError::Dependency)?;
    info!(actor = %actor, plan_id = %id, model = %model, days = generated.len(), "plan variant generated");

    update_diet_plan(
        state,
        actor,
        id,
        PlanUpdate {
            variant: Some((model, generated)),
            ..Default::default()
        },
    )
    .await
}

/// How many plan days are left out of `total_days`, counted in whole days
/// since the plan was created. Can go negative once the plan outlives its
/// horizon.
pub async fn remaining_days(
    state: &AppState,
    id: Uuid,
    total_days: i64,
) -> Result<i64, ApiError> {
    let plan = fetch(state, id).await?;
    let since_creation = (OffsetDateTime::now_utc() - plan.created_at).whole_days();
    Ok(total_days - since_creation)
}
