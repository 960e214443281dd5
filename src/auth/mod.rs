use crate::state::AppState;
use axum::Router;

mod claims;
mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use extractors::{require_session, AuthUser};

/// Routes reachable without a session.
pub fn public_router() -> Router<AppState> {
    handlers::auth_routes()
}

/// Routes that expect [`require_session`] to be layered on top.
pub fn session_router() -> Router<AppState> {
    handlers::me_routes()
}
