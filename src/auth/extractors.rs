use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};
use tracing::{instrument, warn};

use super::jwt::JwtKeys;
use crate::{error::AppError, state::AppState};

/// Name of the cookie that carries the session token.
pub const SESSION_COOKIE: &str = "jwt";

/// Id of the caller, bound by [`require_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

/// Session token from `Authorization: Bearer`, falling back to the session cookie.
pub(crate) fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.typed_get::<Authorization<Bearer>>() {
        let token = auth.token().trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Admits a request only with a valid session token; otherwise answers
/// with the rejection and never runs the inner service.
#[instrument(skip_all, name = "middleware.session")]
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = session_token(req.headers()) else {
        warn!(uri = %req.uri(), "missing session token");
        return Err(AppError::MissingToken);
    };

    let user_id = JwtKeys::from_ref(&state).verify(&token).map_err(|e| {
        warn!(error = %e, "session token rejected");
        AppError::from(e)
    })?;

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AppError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn reads_bearer_header() {
        let h = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(session_token(&h).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn reads_session_cookie() {
        let h = headers(&[(header::COOKIE, "theme=dark; jwt=abc.def.ghi")]);
        assert_eq!(session_token(&h).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn header_wins_over_cookie() {
        let h = headers(&[
            (header::AUTHORIZATION, "Bearer from-header"),
            (header::COOKIE, "jwt=from-cookie"),
        ]);
        assert_eq!(session_token(&h).as_deref(), Some("from-header"));
    }

    #[test]
    fn absent_or_empty_is_none() {
        assert_eq!(session_token(&HeaderMap::new()), None);
        assert_eq!(session_token(&headers(&[(header::COOKIE, "jwt=")])), None);
        assert_eq!(
            session_token(&headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")])),
            None
        );
    }
}
