// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{games, healthcheck, players, quizes, users},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router under `/v1`.
///
/// * Lists and single-entity reads are public.
/// * Creates and updates require an authenticated user.
/// * Deletes require the admin role, checked after authentication.
/// * Applies global middleware (Trace, CORS) and injects the state.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let player_routes = Router::new()
        .route("/players", get(players::list_players))
        .route("/players/{id}", get(players::get_player))
        .merge(
            Router::new()
                .route("/players", post(players::create_player))
                .route("/players/{id}", put(players::update_player))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .merge(
            Router::new()
                .route("/players/{id}", delete(players::delete_player))
                // Auth first, then the role check
                .layer(middleware::from_fn(admin_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let quiz_routes = Router::new()
        .route("/quizes", get(quizes::list_quizes))
        .route("/quizes/{id}", get(quizes::get_quiz))
        .merge(
            Router::new()
                .route("/quizes", post(quizes::create_quiz))
                .route("/quizes/{id}", put(quizes::update_quiz))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .merge(
            Router::new()
                .route("/quizes/{id}", delete(quizes::delete_quiz))
                .layer(middleware::from_fn(admin_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let game_routes = Router::new()
        .route("/games", get(games::list_games))
        .route("/games/{id}", get(games::get_game))
        .merge(
            Router::new()
                .route("/games", post(games::create_game))
                .route("/games/{id}", put(games::update_game))
                .route("/games/{id}/answer", post(games::answer_game))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .merge(
            Router::new()
                .route("/games/{id}", delete(games::delete_game))
                .layer(middleware::from_fn(admin_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let user_routes = Router::new()
        .route("/users", post(users::register))
        .route("/users/login", post(users::login));

    let v1 = Router::new()
        .route("/healthcheck", get(healthcheck::healthcheck))
        .merge(player_routes)
        .merge(quiz_routes)
        .merge(game_routes)
        .merge(user_routes);

    Router::new()
        .nest("/v1", v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
