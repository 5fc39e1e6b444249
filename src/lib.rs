// src/lib.rs

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

pub use config::Config;
pub use routes::create_router;
pub use state::AppState;
