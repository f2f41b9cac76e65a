use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::plans::service::recompute;
use crate::state::AppState;

use super::cache::CachedUser;

/// Profile read, cache-first. A fresh snapshot is served as-is; a miss
/// loads the user record plus its referenced diet plan and backfills the
/// cache before returning.
pub async fn get_profile(state: &AppState, user_id: Uuid) -> Result<CachedUser, ApiError> {
    if let Some(snapshot) = state.cache.get(user_id) {
        debug!(user_id = %user_id, "profile served from cache");
        return Ok(snapshot);
    }

    let record = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::UserNotFound(user_id))?;

    let diet_plan = match record.diet_plan_id {
        Some(plan_id) => match state.store.find_by_id(plan_id).await? {
            Some(mut plan) => {
                recompute(state, &mut plan).await?;
                Some(plan)
            }
            // Dangling reference; serve the profile without a plan.
            None => None,
        },
        None => None,
    };

    let snapshot = CachedUser::from_record(record, diet_plan);
    state.cache.insert(snapshot.clone());
    Ok(snapshot)
}
