use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::{Cart, CartItem, CartSummary, Product},
};

const TAX_RATE: f64 = 0.10;
const FREE_SHIPPING_THRESHOLD: f64 = 100.0;
const FLAT_SHIPPING: f64 = 15.0;
const CART_TTL_DAYS: i64 = 30;

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Full recompute from the current items. Summary values are never patched
/// incrementally.
pub fn summarize(items: &[CartItem]) -> CartSummary {
    if items.is_empty() {
        return CartSummary::empty();
    }
    let subtotal: f64 = items.iter().map(|item| item.total_price).sum();
    let tax = subtotal * TAX_RATE;
    let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
        0.0
    } else {
        FLAT_SHIPPING
    };
    let total = subtotal + tax + shipping;
    let item_count = items.iter().map(|item| item.quantity).sum();

    CartSummary {
        subtotal: round2(subtotal),
        tax: round2(tax),
        shipping: round2(shipping),
        total: round2(total),
        currency: "USD".to_string(),
        item_count,
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    user_id: Uuid,
    is_persistent: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

async fn fetch_cart_row(pool: &DbPool, user_id: Uuid) -> AppResult<Option<CartRow>> {
    let row = sqlx::query_as::<_, CartRow>(
        "SELECT id, user_id, is_persistent, expires_at, created_at, updated_at
         FROM carts WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

async fn insert_cart_row(pool: &DbPool, user_id: Uuid) -> AppResult<CartRow> {
    let row = sqlx::query_as::<_, CartRow>(
        "INSERT INTO carts (id, user_id, expires_at)
         VALUES ($1, $2, now() + make_interval(days => $3))
         RETURNING id, user_id, is_persistent, expires_at, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(CART_TTL_DAYS as i32)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

async fn load_items(pool: &DbPool, cart_id: Uuid) -> AppResult<Vec<CartItem>> {
    let items = sqlx::query_as::<_, CartItem>(
        "SELECT * FROM cart_items WHERE cart_id = $1 ORDER BY added_at",
    )
    .bind(cart_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

async fn store_summary(pool: &DbPool, cart_id: Uuid, summary: &CartSummary) -> AppResult<()> {
    sqlx::query(
        "UPDATE carts
         SET subtotal = $2, tax = $3, shipping = $4, total = $5, item_count = $6,
             updated_at = now()
         WHERE id = $1",
    )
    .bind(cart_id)
    .bind(summary.subtotal)
    .bind(summary.tax)
    .bind(summary.shipping)
    .bind(summary.total)
    .bind(summary.item_count)
    .execute(pool)
    .await?;
    Ok(())
}

async fn assemble(pool: &DbPool, row: CartRow) -> AppResult<Cart> {
    let items = load_items(pool, row.id).await?;
    let summary = summarize(&items);
    store_summary(pool, row.id, &summary).await?;
    Ok(Cart {
        id: row.id,
        user_id: row.user_id,
        items,
        summary,
        is_persistent: row.is_persistent,
        expires_at: row.expires_at,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Returns the user's cart, creating an empty one with a 30-day expiry when
/// none exists.
pub async fn get_or_create_cart(pool: &DbPool, user_id: Uuid) -> AppResult<Cart> {
    let row = match fetch_cart_row(pool, user_id).await? {
        Some(row) => row,
        None => insert_cart_row(pool, user_id).await?,
    };
    assemble(pool, row).await
}

pub async fn add_item(
    pool: &DbPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    product: &Product,
) -> AppResult<Cart> {
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let row = match fetch_cart_row(pool, user_id).await? {
        Some(row) => row,
        None => insert_cart_row(pool, user_id).await?,
    };

    let existing = sqlx::query_as::<_, CartItem>(
        "SELECT * FROM cart_items WHERE cart_id = $1 AND product_id = $2",
    )
    .bind(row.id)
    .bind(product_id)
    .fetch_optional(pool)
    .await?;

    if let Some(item) = existing {
        // Unit price stays as captured at add time.
        let new_quantity = item.quantity + quantity;
        sqlx::query(
            "UPDATE cart_items SET quantity = $2, total_price = $3 WHERE id = $1",
        )
        .bind(item.id)
        .bind(new_quantity)
        .bind(round2(f64::from(new_quantity) * item.unit_price))
        .execute(pool)
        .await?;
    } else {
        let image = product
            .images
            .first()
            .map(|img| img.url.clone())
            .unwrap_or_default();
        let unit_price = product.min_price;
        sqlx::query(
            "INSERT INTO cart_items
                 (id, cart_id, product_id, product_name, product_image, quantity,
                  unit_price, total_price, currency, supplier_id, supplier_name, variants)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(Uuid::new_v4())
        .bind(row.id)
        .bind(product_id)
        .bind(&product.name)
        .bind(image)
        .bind(quantity)
        .bind(unit_price)
        .bind(round2(f64::from(quantity) * unit_price))
        .bind(&product.currency)
        .bind(&product.supplier.id)
        .bind(&product.supplier.name)
        .bind(Json(product.variants.0.clone()))
        .execute(pool)
        .await?;
    }

    assemble(pool, row).await
}

/// Missing cart and missing item both signal NotFound.
pub async fn remove_item(pool: &DbPool, user_id: Uuid, product_id: Uuid) -> AppResult<Cart> {
    let row = fetch_cart_row(pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
        .bind(row.id)
        .bind(product_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    assemble(pool, row).await
}

pub async fn update_item_quantity(
    pool: &DbPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<Cart> {
    let row = fetch_cart_row(pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if quantity <= 0 {
        // Zero or negative quantity removes the item instead of storing it.
        let result =
            sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
                .bind(row.id)
                .bind(product_id)
                .execute(pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
    } else {
        let item = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(row.id)
        .bind(product_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)?;

        sqlx::query("UPDATE cart_items SET quantity = $2, total_price = $3 WHERE id = $1")
            .bind(item.id)
            .bind(quantity)
            .bind(round2(f64::from(quantity) * item.unit_price))
            .execute(pool)
            .await?;
    }

    assemble(pool, row).await
}

pub async fn clear_cart(pool: &DbPool, user_id: Uuid) -> AppResult<Cart> {
    let row = fetch_cart_row(pool, user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
        .bind(row.id)
        .execute(pool)
        .await?;

    assemble(pool, row).await
}

/// Expiry sweep for abandoned non-persistent carts. Housekeeping, not
/// enforced per write.
pub async fn cleanup_expired_carts(pool: &DbPool) -> AppResult<u64> {
    let result =
        sqlx::query("DELETE FROM carts WHERE expires_at < now() AND NOT is_persistent")
            .execute(pool)
            .await?;
    let deleted = result.rows_affected();
    tracing::info!(deleted, "cleaned up expired carts");
    Ok(deleted)
}
