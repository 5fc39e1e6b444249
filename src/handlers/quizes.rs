// src/handlers/quizes.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::{AppError, Violations},
    extract::{Json, Path, Query},
    models::quiz::{CreateQuizRequest, QuizListQuery, UpdateQuizRequest, validate_quiz},
    state::AppState,
};

/// Creates a new quiz. The parallel questions/answers arrays are validated
/// before the insert.
pub async fn create_quiz(
    State(state): State<AppState>,
    Json(input): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Violations::new();
    validate_quiz(
        &input.category,
        input.reward,
        &input.questions,
        &input.answers,
        &mut v,
    );
    v.into_result()?;

    let quiz = state.quizes.insert(&input).await?;

    Ok((StatusCode::CREATED, Json(json!({ "quiz": quiz }))))
}

/// Lists quizes. Filters arrive as `category`, `rewardFrom`, `rewardTo`
/// plus the shared `page`, `page_size`, `sort` parameters.
pub async fn list_quizes(
    State(state): State<AppState>,
    Query(query): Query<QuizListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (filters, params) = query.resolve()?;
    let (quizes, metadata) = state.quizes.get_all(&filters, &params).await?;

    Ok(Json(json!({ "quizes": quizes, "metadata": metadata })))
}

pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = state.quizes.get(id).await?;

    Ok(Json(json!({ "quiz": quiz })))
}

/// Merges the partial update into the stored quiz, re-validates the result,
/// and writes it back.
pub async fn update_quiz(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut quiz = state.quizes.get(id).await?;

    if let Some(category) = input.category {
        quiz.category = category;
    }
    if let Some(reward) = input.reward {
        quiz.reward = reward;
    }
    if let Some(questions) = input.questions {
        quiz.questions = questions;
    }
    if let Some(answers) = input.answers {
        quiz.answers = answers;
    }

    let mut v = Violations::new();
    validate_quiz(
        &quiz.category,
        quiz.reward,
        &quiz.questions,
        &quiz.answers,
        &mut v,
    );
    v.into_result()?;

    let quiz = state.quizes.update(&quiz).await?;

    Ok(Json(json!({ "quiz": quiz })))
}

pub async fn delete_quiz(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.quizes.delete(id).await?;

    Ok(Json(json!({ "message": "success" })))
}
