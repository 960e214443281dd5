use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::{
    auth::{
        jwt::JwtKeys,
        password::{hash_password, verify_credentials, MIN_PASSWORD_LEN},
        repo_types::PublicUser,
    },
    db::RepoError,
    error::AppError,
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registers a new user and returns its public profile.
pub async fn signup(
    st: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<PublicUser, AppError> {
    let username = username.trim();
    let email = normalize_email(email);

    if username.is_empty() {
        return Err(AppError::Validation("Username is required".into()));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation("Invalid email".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let hash = hash_password(password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        anyhow::Error::new(e)
    })?;

    let user = match st.users.create(username, &email, &hash).await {
        Ok(u) => u,
        Err(RepoError::Duplicate(_)) => {
            warn!(email = %email, "email already registered");
            return Err(AppError::DuplicateEmail);
        }
        Err(e) => return Err(anyhow::Error::new(e).context("create user").into()),
    };

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user.into())
}

/// Checks credentials and issues a session token.
///
/// An unknown email and a wrong password are indistinguishable to the caller.
pub async fn login(
    st: &AppState,
    email: &str,
    password: &str,
) -> Result<(String, PublicUser), AppError> {
    let email = normalize_email(email);

    let user = match st.users.find_by_email(&email).await {
        Ok(u) => Some(u),
        Err(RepoError::NotFound) => None,
        Err(e) => return Err(anyhow::Error::new(e).context("find user by email").into()),
    };

    let stored = user.as_ref().map(|u| u.password_hash.as_str());
    let ok = verify_credentials(password, stored).map_err(|e| {
        error!(error = %e, email = %email, "verify_credentials failed");
        anyhow::Error::new(e)
    })?;
    let user = match user {
        Some(u) if ok => u,
        Some(u) => {
            warn!(user_id = u.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = JwtKeys::from_ref(st).issue(user.id)?;

    info!(user_id = user.id, "user logged in");
    Ok((token, user.into()))
}

/// Public profile of a user whose id came from a verified token.
pub async fn fetch(st: &AppState, user_id: i64) -> Result<PublicUser, AppError> {
    match st.users.find_by_id(user_id).await {
        Ok(u) => Ok(u.into()),
        Err(RepoError::NotFound) => {
            warn!(user_id, "session user no longer exists");
            Err(AppError::NotFound("User"))
        }
        Err(e) => Err(anyhow::Error::new(e).context("find user by id").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("alice@x.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@x"));
        assert!(!is_valid_email("al ice@x.com"));
        assert!(!is_valid_email("@x.com"));
    }

    #[tokio::test]
    async fn signup_returns_public_profile() {
        let st = AppState::fake();
        let user = signup(&st, "alice", "alice@x.com", "password123").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@x.com");

        let json = serde_json::to_value(&user).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 3);
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn signup_normalizes_email() {
        let st = AppState::fake();
        let user = signup(&st, " bob ", "  Bob@X.COM ", "password123").await.unwrap();
        assert_eq!(user.username, "bob");
        assert_eq!(user.email, "bob@x.com");
    }

    #[tokio::test]
    async fn second_signup_with_same_email_is_rejected() {
        let st = AppState::fake();
        signup(&st, "alice", "alice@x.com", "password123").await.unwrap();
        let err = signup(&st, "alice2", "ALICE@x.com", "password456")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
    }

    #[tokio::test]
    async fn signup_validates_input() {
        let st = AppState::fake();
        for (username, email, password) in [
            ("alice", "alice@x.com", "short"),
            ("alice", "not-an-email", "password123"),
            ("   ", "alice@x.com", "password123"),
        ] {
            let err = signup(&st, username, email, password).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{username}/{email}");
        }
        // nothing was persisted
        assert!(matches!(
            st.users.find_by_email("alice@x.com").await,
            Err(RepoError::NotFound)
        ));
    }

    #[tokio::test]
    async fn login_issues_token_for_the_user() {
        let st = AppState::fake();
        let created = signup(&st, "alice", "alice@x.com", "password123").await.unwrap();

        let (token, user) = login(&st, "Alice@x.com", "password123").await.unwrap();
        assert_eq!(user, created);
        assert_eq!(JwtKeys::from_ref(&st).verify(&token).unwrap(), created.id);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let st = AppState::fake();
        signup(&st, "alice", "alice@x.com", "password123").await.unwrap();

        let wrong_password = login(&st, "alice@x.com", "password124").await.unwrap_err();
        let unknown_email = login(&st, "nobody@x.com", "password123").await.unwrap_err();
        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_email, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn fetch_resolves_existing_user_only() {
        let st = AppState::fake();
        let created = signup(&st, "alice", "alice@x.com", "password123").await.unwrap();
        assert_eq!(fetch(&st, created.id).await.unwrap(), created);
        assert!(matches!(fetch(&st, 999).await, Err(AppError::NotFound(_))));
    }
}
