use marketplace_api::{
    models::RecommendationScore,
    services::recommendation_service::{
        CATEGORY_BASE_SCORE, FAVORITE_CATEGORY_BONUS, POPULARITY_BOOST_CAP, behavior_score,
        behavior_weight, category_score, interaction_weight, merge_candidates,
    },
};
use uuid::Uuid;

fn candidate(product_id: Uuid, score: f64) -> RecommendationScore {
    RecommendationScore {
        product_id,
        score,
        reasons: vec!["test".into()],
        confidence: 0.5,
    }
}

#[test]
fn interaction_weights_rank_purchase_highest() {
    assert_eq!(interaction_weight("view"), 0.1);
    assert_eq!(interaction_weight("like"), 0.3);
    assert_eq!(interaction_weight("cart_add"), 0.6);
    assert_eq!(interaction_weight("purchase"), 1.0);
    // Unknown actions fall back to the view weight.
    assert_eq!(interaction_weight("hover"), 0.1);
}

#[test]
fn behavior_weights_rank_purchase_highest() {
    assert_eq!(behavior_weight("view"), 1.0);
    assert_eq!(behavior_weight("like"), 2.0);
    assert_eq!(behavior_weight("cart_add"), 5.0);
    assert_eq!(behavior_weight("purchase"), 10.0);
}

#[test]
fn behavior_score_is_normalized() {
    assert_eq!(behavior_score(&[]), 0.0);
    assert_eq!(behavior_score(&["view", "purchase"]), 0.55);
    assert_eq!(behavior_score(&["purchase", "purchase"]), 1.0);
    assert_eq!(behavior_score(&["view"]), 0.1);
}

#[test]
fn category_score_adds_favorite_bonus_and_popularity() {
    let favorites = vec!["electronics".to_string()];

    let plain = category_score("hardware", 0, &favorites);
    assert_eq!(plain, CATEGORY_BASE_SCORE);

    let favored = category_score("electronics", 0, &favorites);
    assert_eq!(favored, CATEGORY_BASE_SCORE + FAVORITE_CATEGORY_BONUS);

    let popular = category_score("hardware", 100, &favorites);
    assert_eq!(popular, CATEGORY_BASE_SCORE + 0.1);
}

#[test]
fn category_score_caps_popularity_and_total() {
    let favorites = vec!["electronics".to_string()];

    // Popularity boost saturates at the cap regardless of view count.
    let capped = category_score("hardware", 1_000_000, &favorites);
    assert_eq!(capped, CATEGORY_BASE_SCORE + POPULARITY_BOOST_CAP);

    // Favorite bonus plus full popularity would exceed 1.0; the total is capped.
    let maxed = category_score("electronics", 1_000_000, &favorites);
    assert_eq!(maxed, 1.0);
}

#[test]
fn merge_sorts_by_score_descending() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let merged = merge_candidates(
        vec![candidate(a, 0.3), candidate(b, 0.9), candidate(c, 0.6)],
        10,
    );
    let ids: Vec<Uuid> = merged.iter().map(|m| m.product_id).collect();
    assert_eq!(ids, vec![b, c, a]);
}

#[test]
fn merge_keeps_highest_score_per_product() {
    let id = Uuid::new_v4();
    let other = Uuid::new_v4();
    let merged = merge_candidates(
        vec![candidate(id, 0.4), candidate(other, 0.5), candidate(id, 0.8)],
        10,
    );
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].product_id, id);
    assert_eq!(merged[0].score, 0.8);
}

#[test]
fn merge_truncates_to_limit() {
    let candidates: Vec<RecommendationScore> = (0..20)
        .map(|i| candidate(Uuid::new_v4(), f64::from(i) / 20.0))
        .collect();
    assert_eq!(merge_candidates(candidates.clone(), 5).len(), 5);
    assert!(merge_candidates(candidates, 0).is_empty());
}
