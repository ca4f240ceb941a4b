use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

use crate::{
    dto::products::{SearchQuery, SearchResults},
    error::AppResult,
    response::{ApiResponse, Meta},
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(search))
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(
        ("q" = String, Query, description = "Search query"),
        ("user_id" = Option<Uuid>, Query, description = "User for search tracking"),
        ("session_id" = Option<String>, Query, description = "Session for search tracking"),
        ("limit" = Option<i64>, Query, description = "Max results, default 20"),
    ),
    responses(
        (status = 200, description = "Search results", body = ApiResponse<SearchResults>)
    ),
    tag = "Search"
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<SearchResults>>> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let products = product_service::search_products(&state.pool, &query.q, limit).await?;

    // Search events are analytics only; a failed insert is logged and the
    // response still succeeds.
    if query.user_id.is_some() || query.session_id.is_some() {
        let properties = serde_json::json!({
            "query": query.q,
            "results_count": products.len(),
        });
        let result = sqlx::query(
            "INSERT INTO tracking_events
                 (id, session_id, user_id, event_type, page_url, properties)
             VALUES ($1, $2, $3, 'search', '/search', $4)",
        )
        .bind(Uuid::new_v4())
        .bind(query.session_id.as_deref().unwrap_or("anonymous"))
        .bind(query.user_id)
        .bind(SqlJson(&properties))
        .execute(&state.pool)
        .await;
        if let Err(err) = result {
            tracing::warn!(error = %err, "search event insert failed");
        }
    }

    let count = products.len();
    Ok(Json(ApiResponse::success(
        "Search results",
        SearchResults {
            query: query.q,
            products,
            count,
        },
        Some(Meta::total(count as i64)),
    )))
}
