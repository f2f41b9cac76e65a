pub mod cache_sync;
pub mod dto;
pub mod handlers;
pub mod merge;
pub mod model;
pub mod nutrition;
pub mod repo;
pub mod service;
pub mod status;
pub mod variants;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
