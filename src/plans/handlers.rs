use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError, state::AppState};

use super::dto::{
    BatchMealStatusRequest, CreateDietPlanRequest, DietPlanResponse, GenerateVariantRequest,
    ListQuery, MealStatusRequest, RemainingDaysQuery, RemainingDaysResponse,
    UpdateDietPlanRequest,
};
use super::model::GenerationModel;
use super::service;
use super::variants::VariantSummary;

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/diet-plans", get(list_plans))
        .route("/diet-plans/:id", get(get_plan))
        .route("/diet-plans/:id/variants", get(list_variants))
        .route("/diet-plans/:id/remaining-days", get(remaining_days))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/diet-plans", post(create_plan))
        .route("/diet-plans/:id", put(update_plan))
        .route("/diet-plans/:id", delete(delete_plan))
        .route("/diet-plans/:id/meal-status", patch(update_meal_status))
        .route("/diet-plans/:id/meal-status/batch", patch(update_meal_status_batch))
        .route("/diet-plans/:id/variants/:model", delete(remove_variant))
        .route("/diet-plans/:id/generate", post(generate_variant))
}

// --- handlers ---

#[instrument(skip(state, body))]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<CreateDietPlanRequest>,
) -> Result<(StatusCode, Json<DietPlanResponse>), (StatusCode, String)> {
    let plan = service::create_diet_plan(&state, actor, body)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(plan.into())))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DietPlanResponse>, (StatusCode, String)> {
    let plan = service::get_diet_plan(&state, id).await.map_err(reject)?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<DietPlanResponse>>, (StatusCode, String)> {
    let plans = service::list_diet_plans(&state, q.on_day)
        .await
        .map_err(reject)?;
    Ok(Json(plans.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, body))]
pub async fn update_plan(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateDietPlanRequest>,
) -> Result<Json<DietPlanResponse>, (StatusCode, String)> {
    let plan = service::update_diet_plan(&state, actor, id, body.into())
        .await
        .map_err(reject)?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DietPlanResponse>, (StatusCode, String)> {
    let plan = service::delete_diet_plan(&state, actor, id)
        .await
        .map_err(reject)?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state, body))]
pub async fn update_meal_status(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<MealStatusRequest>,
) -> Result<Json<DietPlanResponse>, (StatusCode, String)> {
    let plan = service::update_meal_status(&state, actor, id, body.into())
        .await
        .map_err(reject)?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state, body))]
pub async fn update_meal_status_batch(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<BatchMealStatusRequest>,
) -> Result<Json<DietPlanResponse>, (StatusCode, String)> {
    let updates = body.updates.into_iter().map(Into::into).collect();
    let plan = service::update_meal_status_batch(&state, actor, id, updates)
        .await
        .map_err(reject)?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state))]
pub async fn list_variants(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<VariantSummary>>, (StatusCode, String)> {
    let summaries = service::list_variants(&state, id).await.map_err(reject)?;
    Ok(Json(summaries))
}

#[instrument(skip(state))]
pub async fn remove_variant(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((id, model)): Path<(Uuid, String)>,
) -> Result<Json<DietPlanResponse>, (StatusCode, String)> {
    let model: GenerationModel = model
        .parse()
        .map_err(|e: String| (StatusCode::BAD_REQUEST, e))?;
    let plan = service::remove_variant(&state, actor, id, model)
        .await
        .map_err(reject)?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state, body))]
pub async fn generate_variant(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<GenerateVariantRequest>,
) -> Result<Json<DietPlanResponse>, (StatusCode, String)> {
    let plan = service::regenerate_plan(&state, actor, id, body.model, body.days)
        .await
        .map_err(reject)?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state))]
pub async fn remaining_days(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    Path(id): Path<Uuid>,
    Query(q): Query<RemainingDaysQuery>,
) -> Result<Json<RemainingDaysResponse>, (StatusCode, String)> {
    let remaining = service::remaining_days(&state, id, q.total_days)
        .await
        .map_err(reject)?;
    Ok(Json(RemainingDaysResponse {
        remaining_days: remaining,
    }))
}

fn reject(e: ApiError) -> (StatusCode, String) {
    let status = match &e {
        ApiError::PlanNotFound(_) | ApiError::UserNotFound(_) | ApiError::MealsNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        ApiError::Dependency(_) => StatusCode::BAD_GATEWAY,
        ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!(error = %e, "request failed");
    }
    (status, e.to_string())
}
