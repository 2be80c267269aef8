use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    categories::{
        dto::{CreateCategoryRequest, KindQuery, UpdateCategoryRequest},
        repo_types::Category,
        services::{category_patch, default_categories, new_category},
    },
    error::{ApiError, ApiResult},
    response::MutationResponse,
    state::AppState,
    store::CategoryStore,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            patch(update_category).delete(delete_category),
        )
}

/// Seeds the default set the first time a user without categories asks.
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<KindQuery>,
) -> ApiResult<Json<Vec<Category>>> {
    let rows = state.store.list_categories(user_id, q.kind).await?;
    if !rows.is_empty() {
        return Ok(Json(rows));
    }

    let all = state
        .store
        .seed_default_categories(user_id, &default_categories())
        .await?;
    Ok(Json(
        all.into_iter()
            .filter(|c| q.kind.map_or(true, |k| c.kind == k))
            .collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<MutationResponse>)> {
    let new = new_category(payload)?;
    let created = state.store.create_category(user_id, new).await?;
    info!(user_id, category_id = created.id, "category created");
    Ok((StatusCode::CREATED, Json(MutationResponse::created(created.id))))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> ApiResult<Json<MutationResponse>> {
    let patch = category_patch(payload)?;
    if patch.is_empty() {
        return Err(ApiError::validation("no fields to update"));
    }
    state
        .store
        .update_category(user_id, id, patch)
        .await
        .map_err(ApiError::store("category"))?;
    Ok(Json(MutationResponse::ok()))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MutationResponse>> {
    state
        .store
        .delete_category(user_id, id)
        .await
        .map_err(ApiError::store("category"))?;
    info!(user_id, category_id = id, "category deleted");
    Ok(Json(MutationResponse::ok()))
}
