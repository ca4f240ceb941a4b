use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::recommendations::{RecommendationList, RecommendationQuery, RecommendedProduct},
    error::AppResult,
    models::RecommendationScore,
    response::{ApiResponse, Meta},
    services::{product_service, recommendation_service},
    state::AppState,
};

const DEFAULT_LIMIT: i64 = 10;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(user_recommendations))
        .route("/session/{session_id}", get(session_recommendations))
}

/// Join scored candidates with their product documents; candidates whose
/// product has vanished are dropped.
async fn hydrate(
    pool: &DbPool,
    scores: Vec<RecommendationScore>,
) -> AppResult<Vec<RecommendedProduct>> {
    let ids: Vec<Uuid> = scores.iter().map(|s| s.product_id).collect();
    let products = product_service::get_products_by_ids(pool, &ids).await?;
    let mut by_id: HashMap<Uuid, _> = products.into_iter().map(|p| (p.id, p)).collect();

    Ok(scores
        .into_iter()
        .filter_map(|score| {
            by_id.remove(&score.product_id).map(|product| RecommendedProduct {
                product,
                score: score.score,
                reasons: score.reasons,
                confidence: score.confidence,
            })
        })
        .collect())
}

#[utoipa::path(
    get,
    path = "/api/recommendations/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("session_id" = Option<String>, Query, description = "Current session, if any"),
        ("limit" = Option<i64>, Query, description = "Max results, default 10"),
    ),
    responses(
        (status = 200, description = "Personalized recommendations", body = ApiResponse<RecommendationList>)
    ),
    tag = "Recommendations"
)]
pub async fn user_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<ApiResponse<RecommendationList>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 100) as usize;
    let scores = recommendation_service::generate_recommendations(
        &state.pool,
        Some(user_id),
        query.session_id.as_deref(),
        limit,
    )
    .await?;

    if let Err(err) = recommendation_service::save_recommendations(
        &state.pool,
        Some(user_id),
        query.session_id.as_deref(),
        &scores,
    )
    .await
    {
        tracing::warn!(error = %err, "recommendation cache write failed");
    }

    let recommendations = hydrate(&state.pool, scores).await?;
    Ok(Json(ApiResponse::success(
        "Recommendations",
        RecommendationList { recommendations },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/recommendations/session/{session_id}",
    params(
        ("session_id" = String, Path, description = "Session ID"),
        ("limit" = Option<i64>, Query, description = "Max results, default 10"),
    ),
    responses(
        (status = 200, description = "Session-based recommendations", body = ApiResponse<RecommendationList>)
    ),
    tag = "Recommendations"
)]
pub async fn session_recommendations(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<ApiResponse<RecommendationList>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 100) as usize;
    let scores = recommendation_service::generate_recommendations(
        &state.pool,
        None,
        Some(&session_id),
        limit,
    )
    .await?;

    let recommendations = hydrate(&state.pool, scores).await?;
    Ok(Json(ApiResponse::success(
        "Recommendations",
        RecommendationList { recommendations },
        Some(Meta::empty()),
    )))
}
