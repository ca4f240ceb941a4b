use axum::{Json, Router, extract::State, routing::post};
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

use crate::{
    dto::tracking::TrackEventRequest,
    error::AppResult,
    models::TrackingEvent,
    response::{ApiResponse, Meta},
    services::recommendation_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/event", post(track_event))
}

/// Event types that also feed the product-interaction log, with the
/// interaction kind each one maps to.
fn interaction_kind(event_type: &str) -> Option<&'static str> {
    match event_type {
        "product_view" => Some("view"),
        "cart_add" => Some("cart_add"),
        _ => None,
    }
}

#[utoipa::path(
    post,
    path = "/api/tracking/event",
    request_body = TrackEventRequest,
    responses(
        (status = 200, description = "Event recorded", body = ApiResponse<serde_json::Value>)
    ),
    tag = "Tracking"
)]
pub async fn track_event(
    State(state): State<AppState>,
    Json(payload): Json<TrackEventRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let event = sqlx::query_as::<_, TrackingEvent>(
        "INSERT INTO tracking_events
             (id, session_id, user_id, event_type, page_url, properties, metadata)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&payload.session_id)
    .bind(payload.user_id)
    .bind(&payload.event_type)
    .bind(&payload.page_url)
    .bind(SqlJson(&payload.properties))
    .bind(SqlJson(&payload.metadata))
    .fetch_one(&state.pool)
    .await?;

    if let Some(kind) = interaction_kind(&payload.event_type) {
        let product_id = payload
            .properties
            .get("product_id")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok());

        if let Some(product_id) = product_id {
            let duration = payload
                .properties
                .get("duration")
                .and_then(serde_json::Value::as_f64);

            recommendation_service::track_interaction(
                &state.pool,
                product_id,
                payload.user_id,
                &payload.session_id,
                kind,
                duration,
            )
            .await?;

            // Behavior aggregate is derived and rebuildable, so a failed
            // refresh is logged rather than failing the event.
            if let Some(user_id) = payload.user_id {
                if let Err(err) =
                    recommendation_service::update_user_behavior(&state.pool, user_id).await
                {
                    tracing::warn!(error = %err, %user_id, "behavior update failed");
                }
            }
        }
    }

    Ok(Json(ApiResponse::success(
        "Event tracked",
        serde_json::json!({ "status": "success", "event_id": event.id }),
        Some(Meta::empty()),
    )))
}
