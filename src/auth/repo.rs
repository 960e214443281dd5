use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crate::auth::repo_types::User;
use crate::db::RepoError;

/// Persistence of user identities and their password hashes.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with [`RepoError::Duplicate`] when the email is taken.
    async fn create(&self, username: &str, email: &str, password_hash: &str)
        -> Result<User, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<User, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<User, RepoError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    #[instrument(skip_all, name = "db.users.create")]
    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip_all, name = "db.users.find_by_email")]
    async fn find_by_email(&self, email: &str) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        user.ok_or(RepoError::NotFound)
    }

    #[instrument(skip(self), name = "db.users.find_by_id")]
    async fn find_by_id(&self, id: i64) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        user.ok_or(RepoError::NotFound)
    }
}
