use crate::state::AppState;
use axum::Router;

mod claims;
mod cookie;
mod dto;
pub(crate) mod extractors;
pub mod handlers;
mod repo;
pub mod repo_types;
pub(crate) mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
