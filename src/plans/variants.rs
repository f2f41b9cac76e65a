use serde::Serialize;
use time::OffsetDateTime;

use super::model::{DayPlan, DietPlan, GenerationModel, PlanVariant};

/// Per-variant summary for the listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct VariantSummary {
    pub model: GenerationModel,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub day_count: usize,
    pub is_active: bool,
}

/// Inserts or replaces the variant carrying the same model tag. A replace
/// overwrites the whole entry, creation timestamp included, so the
/// variants list never holds two entries for one tag.
pub fn upsert_variant(variants: &mut Vec<PlanVariant>, variant: PlanVariant) {
    match variants.iter().position(|v| v.model == variant.model) {
        Some(i) => variants[i] = variant,
        None => variants.push(variant),
    }
}

/// Drops the variant with the given tag. Returns whether anything was
/// removed; absence is a no-op.
pub fn remove_variant(variants: &mut Vec<PlanVariant>, model: GenerationModel) -> bool {
    let before = variants.len();
    variants.retain(|v| v.model != model);
    variants.len() != before
}

/// Index of the variant the plan currently resolves to: the one matching
/// `active_model`, else the most recently created one. `None` means the
/// canonical plan is active (no variants at all).
fn active_index(plan: &DietPlan) -> Option<usize> {
    if let Some(tag) = plan.active_model {
        if let Some(i) = plan.variants.iter().position(|v| v.model == tag) {
            return Some(i);
        }
    }
    plan.variants
        .iter()
        .enumerate()
        .max_by_key(|(_, v)| v.created_at)
        .map(|(i, _)| i)
}

/// Tag of the currently active variant, if any variant is active.
pub fn active_tag(plan: &DietPlan) -> Option<GenerationModel> {
    active_index(plan).map(|i| plan.variants[i].model)
}

/// The day-plan sequence a reader should see: the active variant's plan,
/// falling back to the canonical plan when no variants exist.
pub fn active_plan(plan: &DietPlan) -> &[DayPlan] {
    match active_index(plan) {
        Some(i) => &plan.variants[i].plan,
        None => &plan.plan,
    }
}

/// Mutable access to the active sequence, for meal-status updates.
pub fn active_plan_mut(plan: &mut DietPlan) -> &mut Vec<DayPlan> {
    match active_index(plan) {
        Some(i) => &mut plan.variants[i].plan,
        None => &mut plan.plan,
    }
}

pub fn variant_summaries(plan: &DietPlan) -> Vec<VariantSummary> {
    let active = active_tag(plan);
    plan.variants
        .iter()
        .map(|v| VariantSummary {
            model: v.model,
            created_at: v.created_at,
            day_count: v.plan.len(),
            is_active: active == Some(v.model),
        })
        .collect()
}
