use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};

use crate::{auth::AuthUser, error::ApiError, state::AppState};

use super::cache::CachedUser;
use super::service;

pub fn routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CachedUser>, (StatusCode, String)> {
    let profile = service::get_profile(&state, user_id)
        .await
        .map_err(reject)?;
    Ok(Json(profile))
}

fn reject(e: ApiError) -> (StatusCode, String) {
    let status = match &e {
        ApiError::UserNotFound(_) | ApiError::PlanNotFound(_) => StatusCode::NOT_FOUND,
        ApiError::MealsNotFound(_) => StatusCode::NOT_FOUND,
        ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        ApiError::Dependency(_) => StatusCode::BAD_GATEWAY,
        ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(error = %e, "request failed");
    }
    (status, e.to_string())
}
