//! Web layer for the shuttle journey planner.
//!
//! Provides JSON endpoints for planning journeys and recording occupancy.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
