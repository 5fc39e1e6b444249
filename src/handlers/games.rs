// src/handlers/games.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::{AppError, Violations},
    extract::{Json, Path, Query},
    models::{
        game::{
            CreateGameRequest, GameListQuery, UpdateGameRequest, validate_game,
            validate_game_refs,
        },
        scoring::{AnswerGameRequest, AnswerOutcome},
    },
    state::AppState,
};

/// Records a game directly, outside the answer workflow. The referenced
/// player and quiz must exist; a dangling reference fails the insert.
pub async fn create_game(
    State(state): State<AppState>,
    Json(input): Json<CreateGameRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Violations::new();
    validate_game_refs(input.player, input.quiz, &mut v);
    v.into_result()?;

    let game = state.games.insert(input.player, input.quiz).await?;

    Ok((StatusCode::CREATED, Json(json!({ "game": game }))))
}

/// Lists games. Filters arrive as `player`, `quiz`, `finishedFrom`,
/// `finishedTo` plus the shared `page`, `page_size`, `sort` parameters.
pub async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<GameListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (filters, params) = query.resolve()?;
    let (games, metadata) = state.games.get_all(&filters, &params).await?;

    Ok(Json(json!({ "games": games, "metadata": metadata })))
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let game = state.games.get(id).await?;

    Ok(Json(json!({ "game": game })))
}

/// Rewrites a game record. `finished` must be sent explicitly; the
/// references merge over the stored row.
pub async fn update_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateGameRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut game = state.games.get(id).await?;

    if let Some(finished) = input.finished {
        game.finished = finished;
    }
    if let Some(player) = input.player {
        game.player = player;
    }
    if let Some(quiz) = input.quiz {
        game.quiz = quiz;
    }

    let mut v = Violations::new();
    validate_game(input.finished, game.player, game.quiz, &mut v);
    v.into_result()?;

    let game = state.games.update(&game).await?;

    Ok(Json(json!({ "game": game })))
}

/// Judges a quiz attempt; the path id names the quiz being answered.
///
/// A correct sheet awards the quiz reward and records the game in one
/// transaction. An incorrect sheet is a normal 200 outcome with no writes.
pub async fn answer_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<AnswerGameRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .scoring
        .judge(id, input.player_id, &input.answers)
        .await?;

    match outcome {
        AnswerOutcome::Correct { player, game } => {
            tracing::info!(
                "player {} answered quiz {} correctly, game {} recorded, score now {}",
                player.id,
                game.quiz,
                game.id,
                player.score
            );
            Ok(Json(json!({ "result": "Answers are correct" })))
        }
        AnswerOutcome::Incorrect => Ok(Json(json!({ "result": "Answers are incorrect" }))),
    }
}

pub async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.games.delete(id).await?;

    Ok(Json(json!({ "message": "success" })))
}
