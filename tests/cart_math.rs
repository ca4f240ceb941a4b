use chrono::Utc;
use marketplace_api::{
    models::{CartItem, CartSummary},
    services::cart_service::{round2, summarize},
};
use sqlx::types::Json;
use uuid::Uuid;

fn item(quantity: i32, unit_price: f64) -> CartItem {
    CartItem {
        id: Uuid::new_v4(),
        cart_id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        product_name: "Widget".into(),
        product_image: String::new(),
        quantity,
        unit_price,
        total_price: round2(f64::from(quantity) * unit_price),
        currency: "USD".into(),
        supplier_id: "sup-1".into(),
        supplier_name: "Acme".into(),
        variants: Json(Vec::new()),
        added_at: Utc::now(),
    }
}

#[test]
fn round2_rounds_to_cents() {
    assert_eq!(round2(1.006), 1.01);
    assert_eq!(round2(114.0000001), 114.0);
    assert_eq!(round2(0.1 + 0.2), 0.3);
}

#[test]
fn flat_shipping_below_threshold() {
    let summary = summarize(&[item(3, 30.0)]);
    assert_eq!(summary.subtotal, 90.0);
    assert_eq!(summary.tax, 9.0);
    assert_eq!(summary.shipping, 15.0);
    assert_eq!(summary.total, 114.0);
    assert_eq!(summary.item_count, 3);
}

#[test]
fn free_shipping_above_threshold() {
    let summary = summarize(&[item(4, 30.0)]);
    assert_eq!(summary.subtotal, 120.0);
    assert_eq!(summary.tax, 12.0);
    assert_eq!(summary.shipping, 0.0);
    assert_eq!(summary.total, 132.0);
    assert_eq!(summary.item_count, 4);
}

#[test]
fn subtotal_exactly_at_threshold_still_pays_shipping() {
    // Free shipping requires strictly more than 100.
    let summary = summarize(&[item(4, 25.0)]);
    assert_eq!(summary.subtotal, 100.0);
    assert_eq!(summary.shipping, 15.0);
    assert_eq!(summary.total, 125.0);
}

#[test]
fn empty_cart_summarizes_to_zero() {
    let summary = summarize(&[]);
    assert_eq!(summary, CartSummary::empty());
    assert_eq!(summary.shipping, 0.0);
    assert_eq!(summary.total, 0.0);
}

#[test]
fn summary_spans_multiple_items() {
    let summary = summarize(&[item(2, 10.5), item(1, 4.25)]);
    assert_eq!(summary.subtotal, 25.25);
    assert_eq!(summary.tax, 2.53);
    assert_eq!(summary.shipping, 15.0);
    assert_eq!(summary.total, 42.78);
    assert_eq!(summary.item_count, 3);
}
