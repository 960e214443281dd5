use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::auth::jwt::TokenError;
use crate::db::RepoError;

/// Which side of the wire has to act on an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Client,
    Internal,
}

/// Every failure a use-case can hand back to a handler.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing session token")]
    MissingToken,
    #[error("Invalid session token")]
    InvalidToken,
    #[error("Session token expired")]
    ExpiredToken,
    #[error("Forbidden")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> FaultKind {
        match self {
            AppError::Internal(_) => FaultKind::Internal,
            _ => FaultKind::Client,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::MissingToken
            | AppError::InvalidToken
            | AppError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid => AppError::InvalidToken,
            TokenError::Expired => AppError::ExpiredToken,
            TokenError::Signing(e) => AppError::Internal(anyhow::Error::new(e).context("jwt signing")),
        }
    }
}

// `Duplicate` is contextual, so use-cases that can hit it map it themselves.
impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound => AppError::NotFound("Record"),
            other => AppError::Internal(other.into()),
        }
    }
}

// Extractor rejections are client input faults and answer in the same
// `{"error": ...}` shape as everything else.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.kind() {
            FaultKind::Client => self.to_string(),
            FaultKind::Internal => {
                error!(error = ?self, "internal fault");
                "internal server error".to_string()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn classifies_client_and_internal_faults() {
        assert_eq!(AppError::Forbidden.kind(), FaultKind::Client);
        assert_eq!(AppError::ExpiredToken.kind(), FaultKind::Client);
        assert_eq!(AppError::DuplicateEmail.kind(), FaultKind::Client);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("pool timed out")).kind(),
            FaultKind::Internal
        );
    }

    #[test]
    fn token_errors_map_onto_session_faults() {
        assert!(matches!(AppError::from(TokenError::Invalid), AppError::InvalidToken));
        assert!(matches!(AppError::from(TokenError::Expired), AppError::ExpiredToken));
    }

    #[test]
    fn repo_not_found_is_a_client_fault() {
        let err = AppError::from(RepoError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn internal_fault_hides_detail() {
        let (status, body) =
            body_of(AppError::Internal(anyhow::anyhow!("password for db is hunter2"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
    }

    #[tokio::test]
    async fn client_fault_carries_message() {
        let (status, body) = body_of(AppError::Validation("Password too short".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Password too short");

        let (status, _) = body_of(AppError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
