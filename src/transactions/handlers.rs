use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    response::MutationResponse,
    state::AppState,
    store::TransactionStore,
    transactions::{
        dto::{
            CreateTransactionRequest, DateRangeQuery, ListQuery, TransactionItem,
            UpdateTransactionRequest,
        },
        services::{
            ensure_category_usable, ensure_patch_consistent, list_params, new_transaction,
            transaction_patch, validate_date_range,
        },
    },
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions/range", get(list_by_date_range))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route(
            "/transactions/:id",
            patch(update_transaction).delete(delete_transaction),
        )
}

#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Vec<TransactionItem>>> {
    let (filter, limit, offset) = list_params(q)?;
    let rows = state
        .store
        .list_transactions(user_id, &filter, limit, offset)
        .await?;
    Ok(Json(rows.into_iter().map(TransactionItem::from).collect()))
}

#[instrument(skip(state))]
pub async fn list_by_date_range(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DateRangeQuery>,
) -> ApiResult<Json<Vec<TransactionItem>>> {
    validate_date_range(q.start_date, q.end_date)?;
    let rows = state
        .store
        .list_transactions_by_date_range(user_id, q.start_date, q.end_date)
        .await?;
    Ok(Json(rows.into_iter().map(TransactionItem::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<MutationResponse>)> {
    let new = new_transaction(payload)?;
    ensure_category_usable(state.store.as_ref(), user_id, new.category_id, new.kind).await?;

    let created = state.store.create_transaction(user_id, new).await?;
    info!(user_id, transaction_id = created.id, "transaction created");
    Ok((StatusCode::CREATED, Json(MutationResponse::created(created.id))))
}

#[instrument(skip(state, payload))]
pub async fn update_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> ApiResult<Json<MutationResponse>> {
    let patch = transaction_patch(payload)?;
    if patch.is_empty() {
        return Err(ApiError::validation("no fields to update"));
    }
    ensure_patch_consistent(state.store.as_ref(), user_id, id, &patch).await?;

    state
        .store
        .update_transaction(user_id, id, patch)
        .await
        .map_err(ApiError::store("transaction"))
        .inspect_err(|_| warn!(user_id, transaction_id = id, "update failed"))?;
    Ok(Json(MutationResponse::ok()))
}

#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MutationResponse>> {
    state
        .store
        .delete_transaction(user_id, id)
        .await
        .map_err(ApiError::store("transaction"))?;
    info!(user_id, transaction_id = id, "transaction deleted");
    Ok(Json(MutationResponse::ok()))
}
