mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

/// Water entry routes; all of them expect a bound session.
pub fn router() -> Router<AppState> {
    handlers::water_routes()
}
