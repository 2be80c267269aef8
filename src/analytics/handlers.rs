use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{debug, instrument};

use crate::{
    analytics::{
        dto::{BreakdownQuery, CategoryBreakdownItem, MonthlyTotal, SummaryResponse},
        services::{monthly_trend, summarize, trend_window},
    },
    auth::extractors::AuthUser,
    error::ApiResult,
    state::AppState,
    store::TransactionStore,
};

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/summary", get(summary))
        .route("/analytics/category-breakdown", get(category_breakdown))
        .route("/analytics/monthly-trend", get(monthly_trend_handler))
}

#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<SummaryResponse>> {
    let stats = state.store.transaction_stats(user_id).await?;
    Ok(Json(summarize(&stats)))
}

#[instrument(skip(state))]
pub async fn category_breakdown(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<BreakdownQuery>,
) -> ApiResult<Json<Vec<CategoryBreakdownItem>>> {
    let rows = state.store.category_breakdown(user_id, q.kind).await?;
    Ok(Json(rows.into_iter().map(CategoryBreakdownItem::from).collect()))
}

#[instrument(skip(state))]
pub async fn monthly_trend_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<MonthlyTotal>>> {
    let (start, end) = trend_window(OffsetDateTime::now_utc()).map_err(anyhow::Error::from)?;
    debug!(%start, %end, "monthly trend window");

    let rows = state
        .store
        .list_transactions_by_date_range(user_id, start, end)
        .await?;
    Ok(Json(monthly_trend(&rows)))
}
