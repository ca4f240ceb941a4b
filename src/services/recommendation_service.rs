use std::collections::{HashMap, HashSet};

use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppResult,
    models::{ProductInteraction, RecommendationScore, UserBehavior, PRODUCT_STATUS_ACTIVE},
};

// Heuristic scoring constants. None of these are calibrated against real
// outcomes; they are tunable knobs, not validated parameters.
pub const CATEGORY_BASE_SCORE: f64 = 0.5;
pub const FAVORITE_CATEGORY_BONUS: f64 = 0.3;
pub const POPULARITY_BOOST_CAP: f64 = 0.2;
pub const POPULARITY_VIEW_SCALE: f64 = 1000.0;
pub const SESSION_SCORE: f64 = 0.8;
pub const TRENDING_SCORE: f64 = 0.5;

const SIMILAR_USER_POOL: i64 = 50;
const SIMILAR_USER_LIMIT: usize = 10;
const FAVORITE_CATEGORY_COUNT: usize = 5;
const BEHAVIOR_SAMPLE_LIMIT: i64 = 1000;
const SESSION_SAMPLE_LIMIT: i64 = 50;
const ALGORITHM_VERSION: &str = "v1.0";

/// Per-action weight used when projecting a similar user's interactions onto
/// candidate products.
pub fn interaction_weight(interaction_type: &str) -> f64 {
    match interaction_type {
        "like" => 0.3,
        "cart_add" => 0.6,
        "purchase" => 1.0,
        _ => 0.1, // view and anything unrecognized
    }
}

/// Per-action weight used for the engagement behavior score.
pub fn behavior_weight(interaction_type: &str) -> f64 {
    match interaction_type {
        "like" => 2.0,
        "cart_add" => 5.0,
        "purchase" => 10.0,
        _ => 1.0,
    }
}

/// Normalized [0,1] engagement score over a set of interactions.
pub fn behavior_score(interaction_types: &[&str]) -> f64 {
    if interaction_types.is_empty() {
        return 0.0;
    }
    let score: f64 = interaction_types.iter().map(|t| behavior_weight(t)).sum();
    let max_possible = interaction_types.len() as f64 * 10.0;
    (score / max_possible).min(1.0)
}

/// Category-affinity score for a single candidate product.
pub fn category_score(category: &str, view_count: i32, favorite_categories: &[String]) -> f64 {
    let mut score = CATEGORY_BASE_SCORE;
    if favorite_categories.iter().any(|c| c == category) {
        score += FAVORITE_CATEGORY_BONUS;
    }
    let popularity = (f64::from(view_count) / POPULARITY_VIEW_SCALE).min(POPULARITY_BOOST_CAP);
    (score + popularity).min(1.0)
}

/// Merge candidate lists: sort by score descending, keep the first (highest
/// scored) occurrence per product, truncate to `limit`.
pub fn merge_candidates(
    mut candidates: Vec<RecommendationScore>,
    limit: usize,
) -> Vec<RecommendationScore> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for candidate in candidates {
        if merged.len() >= limit {
            break;
        }
        if seen.insert(candidate.product_id) {
            merged.push(candidate);
        }
    }
    merged
}

#[derive(Debug, sqlx::FromRow)]
struct ProductCategoryRow {
    id: Uuid,
    category: String,
    view_count: i32,
}

/// Generate heuristic recommendations for a user and/or session. Trending
/// products are a fallback used only when every other path produced nothing.
pub async fn generate_recommendations(
    pool: &DbPool,
    user_id: Option<Uuid>,
    session_id: Option<&str>,
    limit: usize,
) -> AppResult<Vec<RecommendationScore>> {
    let mut candidates = Vec::new();

    if let Some(user_id) = user_id {
        candidates.extend(user_based_candidates(pool, user_id, limit / 2).await?);
        candidates.extend(collaborative_candidates(pool, user_id, limit / 2).await?);
    }

    if let Some(session_id) = session_id {
        candidates.extend(session_based_candidates(pool, session_id, limit).await?);
    }

    if candidates.is_empty() {
        candidates = trending_candidates(pool, limit).await?;
    }

    Ok(merge_candidates(candidates, limit))
}

/// Candidates from the user's favorite categories, scored by affinity and
/// product popularity.
async fn user_based_candidates(
    pool: &DbPool,
    user_id: Uuid,
    limit: usize,
) -> AppResult<Vec<RecommendationScore>> {
    let behavior = sqlx::query_as::<_, UserBehavior>(
        "SELECT * FROM user_behaviors WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let favorites = match behavior {
        Some(behavior) if !behavior.favorite_categories.is_empty() => {
            behavior.favorite_categories
        }
        _ => return Ok(Vec::new()),
    };

    let products = sqlx::query_as::<_, ProductCategoryRow>(
        "SELECT id, category, view_count FROM products
         WHERE category = ANY($1) AND status = $2
         LIMIT $3",
    )
    .bind(&favorites)
    .bind(PRODUCT_STATUS_ACTIVE)
    .bind((limit * 2) as i64)
    .fetch_all(pool)
    .await?;

    let mut candidates: Vec<RecommendationScore> = products
        .into_iter()
        .map(|product| RecommendationScore {
            product_id: product.id,
            score: category_score(&product.category, product.view_count, &favorites),
            reasons: vec![format!("Matches your interest in {}", product.category)],
            confidence: 0.7,
        })
        .collect();
    candidates.truncate(limit);
    Ok(candidates)
}

#[derive(Debug, sqlx::FromRow)]
struct SimilarUserRow {
    user_id: Uuid,
    shared: i64,
}

/// Collaborative filtering by product co-occurrence: users sharing products
/// with this user vote on their other interactions, weighted by similarity.
async fn collaborative_candidates(
    pool: &DbPool,
    user_id: Uuid,
    limit: usize,
) -> AppResult<Vec<RecommendationScore>> {
    let own: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT product_id FROM product_interactions WHERE user_id = $1 LIMIT $2",
    )
    .bind(user_id)
    .bind(BEHAVIOR_SAMPLE_LIMIT)
    .fetch_all(pool)
    .await?;

    if own.is_empty() {
        return Ok(Vec::new());
    }
    let own_products: Vec<Uuid> = own
        .into_iter()
        .map(|(id,)| id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let similar = sqlx::query_as::<_, SimilarUserRow>(
        "SELECT user_id, COUNT(DISTINCT product_id) AS shared
         FROM product_interactions
         WHERE product_id = ANY($1) AND user_id IS NOT NULL AND user_id <> $2
         GROUP BY user_id
         ORDER BY shared DESC
         LIMIT $3",
    )
    .bind(&own_products)
    .bind(user_id)
    .bind(SIMILAR_USER_POOL)
    .fetch_all(pool)
    .await?;

    let mut product_scores: HashMap<Uuid, f64> = HashMap::new();
    for row in similar.into_iter().take(SIMILAR_USER_LIMIT) {
        let similarity = (row.shared as f64 / own_products.len() as f64).min(1.0);

        let others: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT product_id, interaction_type FROM product_interactions
             WHERE user_id = $1 AND NOT (product_id = ANY($2))
             LIMIT 100",
        )
        .bind(row.user_id)
        .bind(&own_products)
        .fetch_all(pool)
        .await?;

        for (product_id, interaction_type) in others {
            *product_scores.entry(product_id).or_insert(0.0) +=
                similarity * interaction_weight(&interaction_type);
        }
    }

    let mut ranked: Vec<(Uuid, f64)> = product_scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(ranked
        .into_iter()
        .take(limit)
        .map(|(product_id, score)| RecommendationScore {
            product_id,
            score: score.min(1.0),
            reasons: vec!["Users with similar interests also liked this".to_string()],
            confidence: 0.6,
        })
        .collect())
}

/// Candidates from the session's dominant category over the last 24 hours,
/// excluding products already seen this session.
async fn session_based_candidates(
    pool: &DbPool,
    session_id: &str,
    limit: usize,
) -> AppResult<Vec<RecommendationScore>> {
    let seen: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT product_id FROM product_interactions
         WHERE session_id = $1 AND occurred_at >= now() - interval '24 hours'
         ORDER BY occurred_at DESC
         LIMIT $2",
    )
    .bind(session_id)
    .bind(SESSION_SAMPLE_LIMIT)
    .fetch_all(pool)
    .await?;

    if seen.is_empty() {
        return Ok(Vec::new());
    }
    let seen_ids: Vec<Uuid> = seen.iter().map(|(id,)| *id).collect();

    // Category frequency is counted per interaction, so repeat views weigh in.
    let categories: Vec<(Uuid, String)> =
        sqlx::query_as("SELECT id, category FROM products WHERE id = ANY($1)")
            .bind(&seen_ids)
            .fetch_all(pool)
            .await?;
    let category_of: HashMap<Uuid, String> = categories.into_iter().collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (product_id,) in &seen {
        if let Some(category) = category_of.get(product_id) {
            *counts.entry(category.as_str()).or_insert(0) += 1;
        }
    }

    let Some((top_category, _)) = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
    else {
        return Ok(Vec::new());
    };

    let similar: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM products
         WHERE category = $1 AND status = $2 AND NOT (id = ANY($3))
         LIMIT $4",
    )
    .bind(top_category)
    .bind(PRODUCT_STATUS_ACTIVE)
    .bind(&seen_ids)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(similar
        .into_iter()
        .map(|(product_id,)| RecommendationScore {
            product_id,
            score: SESSION_SCORE,
            reasons: vec![format!("Based on your current browsing in {top_category}")],
            confidence: 0.8,
        })
        .collect())
}

async fn trending_candidates(pool: &DbPool, limit: usize) -> AppResult<Vec<RecommendationScore>> {
    let trending: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM products WHERE status = $1 ORDER BY view_count DESC LIMIT $2",
    )
    .bind(PRODUCT_STATUS_ACTIVE)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(trending
        .into_iter()
        .map(|(product_id,)| RecommendationScore {
            product_id,
            score: TRENDING_SCORE,
            reasons: vec!["Trending product".to_string()],
            confidence: 0.4,
        })
        .collect())
}

/// Record an interaction event. A `view` also bumps the product's view
/// counter; the two statements are independent, and a stale counter is
/// acceptable for this non-authoritative signal.
pub async fn track_interaction(
    pool: &DbPool,
    product_id: Uuid,
    user_id: Option<Uuid>,
    session_id: &str,
    interaction_type: &str,
    duration: Option<f64>,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO product_interactions
             (id, product_id, user_id, session_id, interaction_type, duration)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(Uuid::new_v4())
    .bind(product_id)
    .bind(user_id)
    .bind(session_id)
    .bind(interaction_type)
    .bind(duration)
    .execute(pool)
    .await?;

    if interaction_type == "view" {
        sqlx::query(
            "UPDATE products SET view_count = view_count + 1, last_viewed = now()
             WHERE id = $1",
        )
        .bind(product_id)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Full recompute of the per-user behavior aggregate from the most recent
/// interactions. Idempotent; safe to rerun at any time.
pub async fn update_user_behavior(pool: &DbPool, user_id: Uuid) -> AppResult<()> {
    let interactions = sqlx::query_as::<_, ProductInteraction>(
        "SELECT * FROM product_interactions
         WHERE user_id = $1
         ORDER BY occurred_at DESC
         LIMIT $2",
    )
    .bind(user_id)
    .bind(BEHAVIOR_SAMPLE_LIMIT)
    .fetch_all(pool)
    .await?;

    if interactions.is_empty() {
        return Ok(());
    }

    let total_views = interactions
        .iter()
        .filter(|i| i.interaction_type == "view")
        .count() as i32;
    let total_searches = interactions
        .iter()
        .filter(|i| i.interaction_type == "search")
        .count() as i32;

    let product_ids: Vec<Uuid> = interactions
        .iter()
        .map(|i| i.product_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let categories: Vec<(Uuid, String)> =
        sqlx::query_as("SELECT id, category FROM products WHERE id = ANY($1)")
            .bind(&product_ids)
            .fetch_all(pool)
            .await?;
    let category_of: HashMap<Uuid, String> = categories.into_iter().collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for interaction in &interactions {
        if let Some(category) = category_of.get(&interaction.product_id) {
            *counts.entry(category.as_str()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let favorite_categories: Vec<String> = ranked
        .into_iter()
        .take(FAVORITE_CATEGORY_COUNT)
        .map(|(category, _)| category.to_string())
        .collect();

    let types: Vec<&str> = interactions
        .iter()
        .map(|i| i.interaction_type.as_str())
        .collect();
    let score = behavior_score(&types);

    sqlx::query(
        "INSERT INTO user_behaviors
             (user_id, total_page_views, total_product_views, total_searches,
              favorite_categories, behavior_score, last_seen)
         VALUES ($1, $2, $3, $4, $5, $6, now())
         ON CONFLICT (user_id) DO UPDATE SET
             total_page_views = EXCLUDED.total_page_views,
             total_product_views = EXCLUDED.total_product_views,
             total_searches = EXCLUDED.total_searches,
             favorite_categories = EXCLUDED.favorite_categories,
             behavior_score = EXCLUDED.behavior_score,
             last_seen = EXCLUDED.last_seen",
    )
    .bind(user_id)
    .bind(total_views)
    .bind(total_views)
    .bind(total_searches)
    .bind(&favorite_categories)
    .bind(score)
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist a generated list as a cache record; never treated as source of
/// truth.
pub async fn save_recommendations(
    pool: &DbPool,
    user_id: Option<Uuid>,
    session_id: Option<&str>,
    recommendations: &[RecommendationScore],
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO user_recommendations
             (id, user_id, session_id, recommendations, algorithm_version)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(session_id)
    .bind(Json(recommendations))
    .bind(ALGORITHM_VERSION)
    .execute(pool)
    .await?;
    Ok(())
}
