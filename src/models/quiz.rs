// src/models/quiz.rs

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

/// Sort values accepted by the quizes list endpoint.
pub const SORT_SAFELIST: &[&str] = &["id", "category", "reward", "-id", "-category", "-reward"];

/// Represents the 'quizes' table in the database. Questions and answers are
/// parallel arrays: position is the correctness key.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Quiz {
    pub id: i64,
    pub category: String,
    pub reward: i64,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateQuizRequest {
    pub category: String,
    pub reward: i64,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

/// DTO for a partial quiz update; absent fields keep their stored value.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateQuizRequest {
    pub category: Option<String>,
    pub reward: Option<i64>,
    pub questions: Option<Vec<String>>,
    pub answers: Option<Vec<String>>,
}

/// Query parameters for listing quizes, raw as they arrived.
#[derive(Debug, Default, Deserialize)]
pub struct QuizListQuery {
    pub category: Option<String>,
    #[serde(rename = "rewardFrom")]
    pub reward_from: Option<String>,
    #[serde(rename = "rewardTo")]
    pub reward_to: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort: Option<String>,
}

/// Resolved quiz list filters in their sentinel form ('' / 0 meaning "no
/// filter on this column").
#[derive(Debug, Clone, Default)]
pub struct QuizFilters {
    pub category: String,
    pub reward_from: i64,
    pub reward_to: i64,
}

impl QuizListQuery {
    /// Validates the raw query values into sentinel filters plus a
    /// pagination window, reporting every bad field in one pass.
    pub fn resolve(&self) -> Result<(QuizFilters, ListParams), AppError> {
        let mut v = Violations::new();

        let filters = QuizFilters {
            category: self.category.clone().unwrap_or_default(),
            reward_from: read_int(&mut v, self.reward_from.as_deref(), "rewardFrom", 0),
            reward_to: read_int(&mut v, self.reward_to.as_deref(), "rewardTo", 0),
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

/// Field rules applied to a quiz before any write. The parallel-array
/// invariant is enforced here: a quiz with mismatched questions and answers
/// could never be judged.
pub fn validate_quiz(
    category: &str,
    reward: i64,
    questions: &[String],
    answers: &[String],
    v: &mut Violations,
) {
    v.check(!category.is_empty(), "category", "must be provided");
    v.check(
        category.len() <= 100,
        "category",
        "must not be more than 100 bytes long",
    );
    v.check(reward >= 0, "reward", "must not be negative");
    v.check(!questions.is_empty(), "questions", "must be provided");
    v.check(
        answers.len() == questions.len(),
        "answers",
        "must contain one answer per question",
    );
}

#[derive(FromRow)]
struct QuizListRow {
    total_records: i64,
    id: i64,
    category: String,
    reward: i64,
    questions: Vec<String>,
    answers: Vec<String>,
}

impl From<QuizListRow> for Quiz {
    fn from(row: QuizListRow) -> Self {
        Quiz {
            id: row.id,
            category: row.category,
            reward: row.reward,
            questions: row.questions,
            answers: row.answers,
        }
    }
}

/// All persistence operations for quizes.
#[derive(Clone)]
pub struct QuizRepo {
    pool: PgPool,
}

impl QuizRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, quiz: &CreateQuizRequest) -> Result<Quiz, AppError> {
        let query = sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizes (category, reward, questions, answers)
            VALUES ($1, $2, $3, $4)
            RETURNING id, category, reward, questions, answers
            "#,
        )
        .bind(&quiz.category)
        .bind(quiz.reward)
        .bind(&quiz.questions)
        .bind(&quiz.answers)
        .fetch_one(&self.pool);

        Ok(timeout(QUERY_TIMEOUT, query).await??)
    }

    pub async fn get(&self, id: i64) -> Result<Quiz, AppError> {
        if id < 1 {
            return Err(AppError::not_found());
        }

        let query = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, category, reward, questions, answers
            FROM quizes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool);

        Ok(timeout(QUERY_TIMEOUT, query).await??)
    }

    /// Lists quizes matching the sentinel filters, one page at a time, with
    /// the windowed total and the id tiebreaker of every list query.
    pub async fn get_all(
        &self,
        filters: &QuizFilters,
        params: &ListParams,
    ) -> Result<(Vec<Quiz>, Metadata), AppError> {
        // Sort fragment interpolated from safelist-validated input only.
        let query = format!(
            r#"
            SELECT count(*) OVER() AS total_records, id, category, reward, questions, answers
            FROM quizes
            WHERE (LOWER(category) = LOWER($1) OR $1 = '')
            AND (reward >= $2 OR $2 = 0)
            AND (reward <= $3 OR $3 = 0)
            ORDER BY {}, id ASC
            LIMIT $4 OFFSET $5
            "#,
            params.order_by()
        );

        let rows = timeout(
            QUERY_TIMEOUT,
            sqlx::query_as::<_, QuizListRow>(&query)
                .bind(&filters.category)
                .bind(filters.reward_from)
                .bind(filters.reward_to)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(&self.pool),
        )
        .await??;

        let total_records = rows.first().map_or(0, |row| row.total_records);
        let metadata = Metadata::calculate(total_records, params);
        let quizes = rows.into_iter().map(Quiz::from).collect();

        Ok((quizes, metadata))
    }

    pub async fn update(&self, quiz: &Quiz) -> Result<Quiz, AppError> {
        if quiz.id < 1 {
            return Err(AppError::not_found());
        }

        let query = sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizes
            SET category = $1, reward = $2, questions = $3, answers = $4
            WHERE id = $5
            RETURNING id, category, reward, questions, answers
            "#,
        )
        .bind(&quiz.category)
        .bind(quiz.reward)
        .bind(&quiz.questions)
        .bind(&quiz.answers)
        .bind(quiz.id)
        .fetch_one(&self.pool);

        Ok(timeout(QUERY_TIMEOUT, query).await??)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if id < 1 {
            return Err(AppError::not_found());
        }

        let query = sqlx::query(
            r#"
            DELETE FROM quizes
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
