// src/models/mod.rs

use std::time::Duration;

pub mod filters;
pub mod game;
pub mod player;
pub mod quiz;
pub mod scoring;
pub mod user;

/// Deadline applied to every database operation. A query that exceeds it is
/// cancelled and surfaces as `AppError::Timeout` rather than hanging the
/// request.
pub(crate) const QUERY_TIMEOUT: Duration = Duration::from_secs(3);
