// src/state.rs

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::{
    config::Config,
    models::{
        game::GameRepo, player::PlayerRepo, quiz::QuizRepo, scoring::ScoringService,
        user::UserRepo,
    },
};

/// Everything a handler needs, built once at startup and threaded through
/// the router. Repositories reach the pool only through this context; there
/// is no ambient global state.
#[derive(Clone)]
pub struct AppState {
    pub players: PlayerRepo,
    pub quizes: QuizRepo,
    pub games: GameRepo,
    pub users: UserRepo,
    pub scoring: ScoringService,
    pub config: Config,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        Self {
            players: PlayerRepo::new(pool.clone()),
            quizes: QuizRepo::new(pool.clone()),
            games: GameRepo::new(pool.clone()),
            users: UserRepo::new(pool.clone()),
            scoring: ScoringService::new(pool),
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
