use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod services;

pub fn router(state: AppState) -> Router<AppState> {
    handlers::admin_routes(state)
}
