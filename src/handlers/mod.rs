// src/handlers/mod.rs

pub mod games;
pub mod healthcheck;
pub mod players;
pub mod quizes;
pub mod users;
