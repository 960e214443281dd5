use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use tracing::instrument;

use super::dto::{CreateWaterRequest, ListQuery, UpdateWaterRequest};
use super::repo_types::{Water, WaterFilter};
use super::services;
use crate::{auth::AuthUser, error::AppError, state::AppState};

pub fn water_routes() -> Router<AppState> {
    Router::new()
        .route("/waters", get(list_waters).post(create_water))
        .route(
            "/waters/:id",
            get(get_water).patch(update_water).delete(delete_water),
        )
}

#[instrument(skip(state))]
pub async fn list_waters(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Query(q), _): WithRejection<Query<ListQuery>, AppError>,
) -> Result<Json<Vec<Water>>, AppError> {
    let filter = WaterFilter::from(q);
    let waters = services::list_for_owner(&state, user_id, &filter).await?;
    Ok(Json(waters))
}

#[instrument(skip(state))]
pub async fn create_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Json(body), _): WithRejection<Json<CreateWaterRequest>, AppError>,
) -> Result<(StatusCode, Json<Water>), AppError> {
    let water = services::create_for_owner(&state, user_id, body.volume).await?;
    Ok((StatusCode::CREATED, Json(water)))
}

#[instrument(skip(state))]
pub async fn get_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Water>, AppError> {
    Ok(Json(services::get_owned(&state, user_id, id).await?))
}

#[instrument(skip(state))]
pub async fn update_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateWaterRequest>, AppError>,
) -> Result<Json<Water>, AppError> {
    Ok(Json(services::update_owned(&state, user_id, id, body.volume).await?))
}

#[instrument(skip(state))]
pub async fn delete_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    services::delete_owned(&state, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
