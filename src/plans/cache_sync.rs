use tracing::{debug, error};
use uuid::Uuid;

use crate::plans::model::DietPlan;
use crate::users::cache::UserCache;
use crate::users::repo::UserDirectory;

/// Pushes a freshly computed plan into the cached snapshot of every user
/// referencing it. Best-effort by contract: the cache is not
/// authoritative, so any failure here is logged and swallowed and the
/// triggering mutation still succeeds. Users without a live cache entry
/// are skipped; they pick the plan up on their next profile read.
pub async fn propagate_plan_update(
    users: &dyn UserDirectory,
    cache: &UserCache,
    plan: &DietPlan,
) {
    let holders = match users.find_by_diet_plan(plan.id).await {
        Ok(holders) => holders,
        Err(e) => {
            error!(error = %e, plan_id = %plan.id, "cache sync: user lookup failed");
            return;
        }
    };

    let mut refreshed = 0;
    for user in holders {
        if cache.set_plan(user.id, Some(plan.clone())) {
            refreshed += 1;
        }
    }
    debug!(plan_id = %plan.id, refreshed, "cache sync after plan mutation");
}

/// Clears the embedded plan from every cached snapshot referencing a
/// deleted plan. The entries themselves survive, so the next read shows
/// the absence without a store round trip.
pub async fn propagate_plan_removal(
    users: &dyn UserDirectory,
    cache: &UserCache,
    plan_id: Uuid,
) {
    let holders = match users.find_by_diet_plan(plan_id).await {
        Ok(holders) => holders,
        Err(e) => {
            error!(error = %e, plan_id = %plan_id, "cache sync: user lookup failed on delete");
            return;
        }
    };

    let mut cleared = 0;
    for user in holders {
        if cache.set_plan(user.id, None) {
            cleared += 1;
        }
    }
    debug!(plan_id = %plan_id, cleared, "cache sync after plan delete");
}
