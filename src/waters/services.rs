use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    db::RepoError,
    error::AppError,
    state::AppState,
    waters::repo_types::{Water, WaterFilter},
};

fn water_err(e: RepoError) -> AppError {
    match e {
        RepoError::NotFound => AppError::NotFound("Water"),
        other => other.into(),
    }
}

fn check_volume(volume: i64) -> Result<(), AppError> {
    if volume <= 0 {
        return Err(AppError::Validation("Volume must be positive".into()));
    }
    Ok(())
}

fn check_filter(filter: &WaterFilter) -> Result<(), AppError> {
    if filter.limit.is_some_and(|l| l <= 0) {
        return Err(AppError::Validation("limit must be positive".into()));
    }
    if filter.offset < 0 {
        return Err(AppError::Validation("offset must not be negative".into()));
    }
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from >= to {
            return Err(AppError::Validation("from must be before to".into()));
        }
    }
    Ok(())
}

/// Loads an entry and checks it belongs to `owner_id`.
async fn find_owned(st: &AppState, owner_id: i64, id: i64) -> Result<Water, AppError> {
    let water = st.waters.get_by_id(id).await.map_err(water_err)?;
    if water.owner_id != owner_id {
        warn!(user_id = owner_id, water_id = id, owner = water.owner_id, "foreign water entry");
        return Err(AppError::Forbidden);
    }
    Ok(water)
}

pub async fn create_for_owner(st: &AppState, owner_id: i64, volume: i64) -> Result<Water, AppError> {
    check_volume(volume)?;
    let water = st
        .waters
        .create(owner_id, volume, OffsetDateTime::now_utc())
        .await?;
    info!(user_id = owner_id, water_id = water.id, volume, "water created");
    Ok(water)
}

/// Only the owner's rows can come back: the owner is part of the query.
pub async fn list_for_owner(
    st: &AppState,
    owner_id: i64,
    filter: &WaterFilter,
) -> Result<Vec<Water>, AppError> {
    check_filter(filter)?;
    Ok(st.waters.list_by_owner(owner_id, filter).await?)
}

pub async fn get_owned(st: &AppState, owner_id: i64, id: i64) -> Result<Water, AppError> {
    find_owned(st, owner_id, id).await
}

pub async fn update_owned(
    st: &AppState,
    owner_id: i64,
    id: i64,
    volume: i64,
) -> Result<Water, AppError> {
    check_volume(volume)?;
    find_owned(st, owner_id, id).await?;
    let water = st
        .waters
        .update_volume(id, volume, OffsetDateTime::now_utc())
        .await
        .map_err(water_err)?;
    info!(user_id = owner_id, water_id = id, volume, "water updated");
    Ok(water)
}

/// Deletes an entry after checking it belongs to `owner_id`.
pub async fn delete_owned(st: &AppState, owner_id: i64, id: i64) -> Result<(), AppError> {
    find_owned(st, owner_id, id).await?;
    st.waters.delete_by_id(id).await?;
    info!(user_id = owner_id, water_id = id, "water deleted");
    Ok(())
}
