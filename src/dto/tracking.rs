use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TrackEventRequest {
    pub session_id: String,
    pub user_id: Option<Uuid>,
    pub event_type: String,
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub properties: serde_json::Value,
    #[serde(default)]
    pub metadata: serde_json::Value,
}
