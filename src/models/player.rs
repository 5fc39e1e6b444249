// src/models/player.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tokio::time::timeout;

use crate::{
    error::{AppError, Violations},
    models::{
        QUERY_TIMEOUT,
        filters::{Filters, ListParams, Metadata, read_int},
    },
};

/// Sort values accepted by the players list endpoint: column names plus
/// their descending variants.
pub const SORT_SAFELIST: &[&str] = &["id", "name", "score", "-id", "-name", "-score"];

/// Represents the 'players' table in the database.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub joined: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub score: i64,
}

/// DTO for creating a new player. Score and timestamps are assigned by the
/// database.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePlayerRequest {
    pub name: String,
}

/// DTO for a partial player update; absent fields keep their stored value.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePlayerRequest {
    pub name: Option<String>,
    pub score: Option<i64>,
}

/// Query parameters for listing players, raw as they arrived.
#[derive(Debug, Default, Deserialize)]
pub struct PlayerListQuery {
    pub name: Option<String>,
    #[serde(rename = "scoreFrom")]
    pub score_from: Option<String>,
    #[serde(rename = "scoreTo")]
    pub score_to: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

/// Resolved player list filters in their sentinel form: an empty name or a
/// zero bound means "no filter on this column", which is how the single
/// parameterized list statement expects them.
#[derive(Debug, Clone, Default)]
pub struct PlayerFilters {
    pub name: String,
    pub score_from: i64,
    pub score_to: i64,
}

impl PlayerListQuery {
    /// Validates the raw query values into sentinel filters plus a
    /// pagination window, reporting every bad field in one pass.
    pub fn resolve(&self) -> Result<(PlayerFilters, ListParams), AppError> {
        let mut v = Violations::new();

        let filters = PlayerFilters {
            name: self.name.clone().unwrap_or_default(),
            score_from: read_int(&mut v, self.score_from.as_deref(), "scoreFrom", 0),
            score_to: read_int(&mut v, self.score_to.as_deref(), "scoreTo", 0),
        };

        let raw = Filters {
            page: self.page.clone(),
            page_size: self.page_size.clone(),
            sort: self.sort.clone(),
        };
        if let Some(params) = raw.validate("id", SORT_SAFELIST, &mut v) {
            if v.is_empty() {
                return Ok((filters, params));
            }
        }

        Err(AppError::Validation(v))
    }
}

/// Field rules applied to a player before any write.
pub fn validate_player(name: &str, score: i64, v: &mut Violations) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(
        name.len() <= 100,
        "name",
        "must not be more than 100 bytes long",
    );
    v.check(score >= 0, "score", "must not be negative");
}

/// Row shape for the list query, which carries the windowed total count in
/// front of the entity columns.
#[derive(FromRow)]
struct PlayerListRow {
    total_records: i64,
    id: i64,
    name: String,
    joined: DateTime<Utc>,
    last_update: DateTime<Utc>,
    score: i64,
}

impl From<PlayerListRow> for Player {
    fn from(row: PlayerListRow) -> Self {
        Player {
            id: row.id,
            name: row.name,
            joined: row.joined,
            last_update: row.last_update,
            score: row.score,
        }
    }
}

/// All persistence operations for players.
#[derive(Clone)]
pub struct PlayerRepo {
    pool: PgPool,
}

impl PlayerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a player with a zero score; the database assigns the id and
    /// both timestamps.
    pub async fn insert(&self, name: &str) -> Result<Player, AppError> {
        let query = sqlx::query_as::<_, Player>(
            r#"
            INSERT INTO players (name)
            VALUES ($1)
            RETURNING id, name, joined, last_update, score
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool);

        Ok(timeout(QUERY_TIMEOUT, query).await??)
    }

    pub async fn get(&self, id: i64) -> Result<Player, AppError> {
        // Identifiers are positive by construction; skip the round trip.
        if id < 1 {
            return Err(AppError::not_found());
        }

        let query = sqlx::query_as::<_, Player>(
            r#"
            SELECT id, name, joined, last_update, score
            FROM players
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool);

        Ok(timeout(QUERY_TIMEOUT, query).await??)
    }

    /// Lists players matching the sentinel filters, one page at a time.
    ///
    /// One statement serves filtered and unfiltered requests alike: each
    /// column matches either the bound value or its sentinel. The windowed
    /// count rides along with every row, and the ascending id tiebreaker
    /// keeps pagination stable when the sort key has duplicates.
    pub async fn get_all(
        &self,
        filters: &PlayerFilters,
        params: &ListParams,
    ) -> Result<(Vec<Player>, Metadata), AppError> {
        // Identifier positions cannot be bound, so the sort fragment is
        // interpolated. Only safelist-validated ListParams reach this point.
        let query = format!(
            r#"
            SELECT count(*) OVER() AS total_records, id, name, joined, last_update, score
            FROM players
            WHERE (LOWER(name) = LOWER($1) OR $1 = '')
            AND (score >= $2 OR $2 = 0)
            AND (score <= $3 OR $3 = 0)
            ORDER BY {}, id ASC
            LIMIT $4 OFFSET $5
            "#,
            params.order_by()
        );

        let rows = timeout(
            QUERY_TIMEOUT,
            sqlx::query_as::<_, PlayerListRow>(&query)
                .bind(&filters.name)
                .bind(filters.score_from)
                .bind(filters.score_to)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool),
        )
        .await??;

        let total_records = rows.first().map_or(0, |row| row.total_records);
        let metadata = Metadata::calculate(total_records, params);
        let players = rows.into_iter().map(Player::from).collect();

        Ok((players, metadata))
    }

    /// Full-row update; bumps `last_update` as part of the same statement.
    pub async fn update(&self, player: &Player) -> Result<Player, AppError> {
        if player.id < 1 {
            return Err(AppError::not_found());
        }

        let query = sqlx::query_as::<_, Player>(
            r#"
            UPDATE players
            SET name = $1, score = $2, last_update = now()
            WHERE id = $3
            RETURNING id, name, joined, last_update, score
            "#,
        )
        .bind(&player.name)
        .bind(player.score)
        .bind(player.id)
        .fetch_one(&self.pool);

        Ok(timeout(QUERY_TIMEOUT, query).await??)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if id < 1 {
            return Err(AppError::not_found());
        }

        let query = sqlx::query(
            r#"
            DELETE FROM players
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool);

        let result = timeout(QUERY_TIMEOUT, query).await??;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }
}
