use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecommendationQuery {
    pub session_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendedProduct {
    pub product: Product,
    pub score: f64,
    pub reasons: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationList {
    pub recommendations: Vec<RecommendedProduct>,
}
