// src/handlers/players.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::{AppError, Violations},
    extract::{Json, Path, Query},
    models::player::{CreatePlayerRequest, PlayerListQuery, UpdatePlayerRequest, validate_player},
    state::AppState,
};

/// Creates a new player with a zero score; timestamps come from the
/// database. Returns 201 and the stored row.
pub async fn create_player(
    State(state): State<AppState>,
    Json(input): Json<CreatePlayerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Violations::new();
    validate_player(&input.name, 0, &mut v);
    v.into_result()?;

    let player = state.players.insert(&input.name).await?;

    Ok((StatusCode::CREATED, Json(json!({ "player": player }))))
}

/// Lists players. Filters arrive as `name`, `scoreFrom`, `scoreTo` plus the
/// shared `page`, `page_size`, `sort` parameters.
pub async fn list_players(
    State(state): State<AppState>,
    Query(query): Query<PlayerListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (filters, params) = query.resolve()?;
    let (players, metadata) = state.players.get_all(&filters, &params).await?;

    Ok(Json(json!({ "players": players, "metadata": metadata })))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let player = state.players.get(id).await?;

    Ok(Json(json!({ "player": player })))
}

/// Merges the partial update into the stored player, re-validates the
/// result, and writes it back.
pub async fn update_player(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePlayerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut player = state.players.get(id).await?;

    if let Some(name) = input.name {
        player.name = name;
    }
    if let Some(score) = input.score {
        player.score = score;
    }

    let mut v = Violations::new();
    validate_player(&player.name, player.score, &mut v);
    v.into_result()?;

    let player = state.players.update(&player).await?;

    Ok(Json(json!({ "player": player })))
}

pub async fn delete_player(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.players.delete(id).await?;

    Ok(Json(json!({ "message": "success" })))
}
