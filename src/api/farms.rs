//! Farm record endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

use super::{ApiError, ApiResult, ApiState, UserQuery, api_error, error_response};
use crate::db::{Farm, FarmInfo, FarmPatch, NewFarm, SoilSnapshot};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub farm_id: String,
}

async fn list_farms(
    State(state): State<Arc<ApiState>>,
    Query(user): Query<UserQuery>,
) -> ApiResult<Vec<Farm>> {
    let user_id = user.resolve(&state);
    state.farms.list_active(&user_id).map(Json).map_err(api_error)
}

async fn create_farm(
    State(state): State<Arc<ApiState>>,
    Query(user): Query<UserQuery>,
    Json(farm): Json<NewFarm>,
) -> Result<(StatusCode, Json<Farm>), ApiError> {
    let user_id = user.resolve(&state);
    let farm = state.farms.create(&user_id, farm).map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(farm)))
}

async fn get_farm(
    State(state): State<Arc<ApiState>>,
    Path(farm_id): Path<String>,
    Query(user): Query<UserQuery>,
) -> ApiResult<Farm> {
    let user_id = user.resolve(&state);
    state
        .farms
        .get(&user_id, &farm_id)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "Farm not found"))
}

async fn update_farm(
    State(state): State<Arc<ApiState>>,
    Path(farm_id): Path<String>,
    Query(user): Query<UserQuery>,
    Json(patch): Json<FarmPatch>,
) -> ApiResult<Farm> {
    let user_id = user.resolve(&state);
    state
        .farms
        .update(&user_id, &farm_id, patch)
        .map(Json)
        .map_err(api_error)
}

async fn delete_farm(
    State(state): State<Arc<ApiState>>,
    Path(farm_id): Path<String>,
    Query(user): Query<UserQuery>,
) -> Result<StatusCode, ApiError> {
    let user_id = user.resolve(&state);
    state.farms.delete(&user_id, &farm_id).map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_soil(
    State(state): State<Arc<ApiState>>,
    Path(farm_id): Path<String>,
    Query(user): Query<UserQuery>,
    Json(soil): Json<SoilSnapshot>,
) -> ApiResult<Farm> {
    let user_id = user.resolve(&state);
    state
        .farms
        .update_soil_data(&user_id, &farm_id, soil)
        .map(Json)
        .map_err(api_error)
}

async fn summary(
    State(state): State<Arc<ApiState>>,
    Query(user): Query<UserQuery>,
) -> ApiResult<FarmInfo> {
    let user_id = user.resolve(&state);
    state
        .farms
        .farm_info_for_assistant(&user_id)
        .map(Json)
        .map_err(api_error)
}

async fn get_selected(
    State(state): State<Arc<ApiState>>,
    Query(user): Query<UserQuery>,
) -> ApiResult<Farm> {
    let user_id = user.resolve(&state);
    state
        .farms
        .selected(&user_id)
        .map_err(api_error)?
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "No farm selected"))
}

async fn set_selected(
    State(state): State<Arc<ApiState>>,
    Query(user): Query<UserQuery>,
    Json(request): Json<SelectRequest>,
) -> ApiResult<Farm> {
    let user_id = user.resolve(&state);
    state
        .farms
        .set_selected(&user_id, &request.farm_id)
        .map(Json)
        .map_err(api_error)
}

/// Build the farms router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list_farms).post(create_farm))
        .route("/summary", get(summary))
        .route("/selected", get(get_selected).put(set_selected))
        .route(
            "/{farm_id}",
            get(get_farm).patch(update_farm).delete(delete_farm),
        )
        .route("/{farm_id}/soil", put(update_soil))
        .with_state(state)
}
