use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// One recorded intake, owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Water {
    pub id: i64,
    #[sqlx(rename = "user_id")]
    pub owner_id: i64,
    pub volume: i64, // millilitres
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Optional refinements for listing an owner's entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaterFilter {
    /// Inclusive lower bound on `created_at`.
    pub from: Option<OffsetDateTime>,
    /// Exclusive upper bound on `created_at`.
    pub to: Option<OffsetDateTime>,
    pub limit: Option<i64>,
    pub offset: i64,
}
