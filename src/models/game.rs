// src/models/game.rs

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

/// Sort values accepted by the games list endpoint.
pub const SORT_SAFELIST: &[&str] = &[
    "id", "finished", "player", "quiz", "-id", "-finished", "-player", "-quiz",
];

/// Represents the 'games' table in the database: one completed attempt of a
/// quiz by a player. The row is written when the attempt is judged, so
/// `finished` carries the write timestamp.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Game {
    pub id: i64,
    pub finished: DateTime<Utc>,
    pub player: i64,
    pub quiz: i64,
}

/// DTO for recording a game directly, outside the answer workflow.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateGameRequest {
    pub player: i64,
    pub quiz: i64,
}

/// DTO for a game update. `finished` must be sent explicitly; the other
/// fields keep their stored value when absent.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateGameRequest {
    pub finished: Option<DateTime<Utc>>,
    pub player: Option<i64>,
    pub quiz: Option<i64>,
}

/// Query parameters for listing games, raw as they arrived.
#[derive(Debug, Default, Deserialize)]
pub struct GameListQuery {
    pub player: Option<String>,
    pub quiz: Option<String>,
    #[serde(rename = "finishedFrom")]
    pub finished_from: Option<String>,
    #[serde(rename = "finishedTo")]
    pub finished_to: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

/// Resolved game list filters in their sentinel form. The timestamp bounds
/// stay textual ('' meaning "no bound") and are cast inside the statement.
#[derive(Debug, Clone, Default)]
pub struct GameFilters {
    pub player: i64,
    pub quiz: i64,
    pub finished_from: String,
    pub finished_to: String,
}

impl GameListQuery {
    /// Validates the raw query values into sentinel filters plus a
    /// pagination window, reporting every bad field in one pass.
    pub fn resolve(&self) -> Result<(GameFilters, ListParams), AppError> {
        let mut v = Violations::new();

        let filters = GameFilters {
            player: read_int(&mut v, self.player.as_deref(), "player", 0),
            quiz: read_int(&mut v, self.quiz.as_deref(), "quiz", 0),
            finished_from: read_timestamp(&mut v, self.finished_from.as_deref(), "finishedFrom"),
            finished_to: read_timestamp(&mut v, self.finished_to.as_deref(), "finishedTo"),
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

/// Reads a timestamp bound, keeping '' as the "no bound" sentinel. Anything
/// non-empty must parse as RFC 3339 so garbage never reaches the cast in
/// the list statement.
fn read_timestamp(v: &mut Violations, raw: Option<&str>, field: &str) -> String {
    let value = raw.unwrap_or_default();
    if !value.is_empty() && DateTime::parse_from_rfc3339(value).is_err() {
        v.add(field, "must be an RFC 3339 timestamp");
    }
    value.to_string()
}

/// Reference rules shared by the create and update paths.
pub fn validate_game_refs(player: i64, quiz: i64, v: &mut Violations) {
    v.check(player >= 1, "player", "must be a positive integer");
    v.check(quiz >= 1, "quiz", "must be a positive integer");
}

/// Update-path rules: an explicit finished timestamp is required.
pub fn validate_game(finished: Option<DateTime<Utc>>, player: i64, quiz: i64, v: &mut Violations) {
    v.check(finished.is_some(), "finished", "must be provided");
    validate_game_refs(player, quiz, v);
}

#[derive(FromRow)]
struct GameListRow {
    total_records: i64,
    id: i64,
    finished: DateTime<Utc>,
    player: i64,
    quiz: i64,
}

impl From<GameListRow> for Game {
    fn from(row: GameListRow) -> Self {
        Game {
            id: row.id,
            finished: row.finished,
            player: row.player,
            quiz: row.quiz,
        }
    }
}

/// All persistence operations for games.
#[derive(Clone)]
pub struct GameRepo {
    pool: PgPool,
}

impl GameRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a finished game; the database stamps `finished` with now().
    pub async fn insert(&self, player: i64, quiz: i64) -> Result<Game, AppError> {
        let query = sqlx::query_as::<_, Game>(
            r#"
            INSERT INTO games (player, quiz)
            VALUES ($1, $2)
            RETURNING id, finished, player, quiz
            "#,
        )
        .bind(player)
        .bind(quiz)
        .fetch_one(&self.pool);

        Ok(timeout(QUERY_TIMEOUT, query).await??)
    }

    pub async fn get(&self, id: i64) -> Result<Game, AppError> {
        if id < 1 {
            return Err(AppError::not_found());
        }

        let query = sqlx::query_as::<_, Game>(
            r#"
            SELECT id, finished, player, quiz
            FROM games
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool);

        Ok(timeout(QUERY_TIMEOUT, query).await??)
    }

    /// Lists games matching the sentinel filters, one page at a time.
    ///
    /// The timestamp bounds arrive as text; NULLIF collapses the '' sentinel
    /// to NULL before the cast, which makes the comparison vacuous instead
    /// of a cast failure, whatever order the planner evaluates the OR in.
    pub async fn get_all(
        &self,
        filters: &GameFilters,
        params: &ListParams,
    ) -> Result<(Vec<Game>, Metadata), AppError> {
        // Sort fragment interpolated from safelist-validated input only.
        let query = format!(
            r#"
            SELECT count(*) OVER() AS total_records, id, finished, player, quiz
            FROM games
            WHERE (player = $1 OR $1 = 0)
            AND (quiz = $2 OR $2 = 0)
            AND (finished > NULLIF($3, '')::timestamptz OR $3 = '')
            AND (finished < NULLIF($4, '')::timestamptz OR $4 = '')
            ORDER BY {}, id ASC
            LIMIT $5 OFFSET $6
            "#,
            params.order_by()
        );

        let rows = timeout(
            QUERY_TIMEOUT,
            sqlx::query_as::<_, GameListRow>(&query)
                .bind(filters.player)
                .bind(filters.quiz)
                .bind(&filters.finished_from)
                .bind(&filters.finished_to)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool),
        )
        .await??;

        let total_records = rows.first().map_or(0, |row| row.total_records);
        let metadata = Metadata::calculate(total_records, params);
        let games = rows.into_iter().map(Game::from).collect();

        Ok((games, metadata))
    }

    pub async fn update(&self, game: &Game) -> Result<Game, AppError> {
        if game.id < 1 {
            return Err(AppError::not_found());
        }

        let query = sqlx::query_as::<_, Game>(
            r#"
            UPDATE games
            SET finished = $1, player = $2, quiz = $3
            WHERE id = $4
            RETURNING id, finished, player, quiz
            "#,
        )
        .bind(game.finished)
        .bind(game.player)
        .bind(game.quiz)
        .bind(game.id)
        .fetch_one(&self.pool);

        Ok(timeout(QUERY_TIMEOUT, query).await??)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if id < 1 {
            return Err(AppError::not_found());
        }

        let query = sqlx::query(
            r#"
            DELETE FROM games
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
