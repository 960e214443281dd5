use serde::Deserialize;
use time::OffsetDateTime;

use crate::waters::repo_types::WaterFilter;

#[derive(Debug, Deserialize)]
pub struct CreateWaterRequest {
    pub volume: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWaterRequest {
    pub volume: i64,
}

/// Query string of `GET /waters`; timestamps are RFC 3339.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub to: Option<OffsetDateTime>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

impl From<ListQuery> for WaterFilter {
    fn from(q: ListQuery) -> Self {
        Self {
            from: q.from,
            to: q.to,
            limit: q.limit,
            offset: q.offset,
        }
    }
}
