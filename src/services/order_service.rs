use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::orders::{CreateOrderRequest, OrderList, OrderWithItems},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    services::cart_service,
};

/// Create an order from the user's current cart, then clear the cart.
/// The two steps are sequential and uncompensated: a cart-clear failure
/// after the order insert leaves the order in place.
pub async fn create_order(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let cart = cart_service::get_or_create_cart(pool, user.user_id).await?;
    if cart.items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let order_id = Uuid::new_v4();
    let invoice_number = build_invoice_number(order_id);

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders
             (id, user_id, invoice_number, subtotal, tax, shipping, total, currency,
              status, shipping_address, payment_method)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9, $10)
         RETURNING *",
    )
    .bind(order_id)
    .bind(user.user_id)
    .bind(invoice_number)
    .bind(cart.summary.subtotal)
    .bind(cart.summary.tax)
    .bind(cart.summary.shipping)
    .bind(cart.summary.total)
    .bind(&cart.summary.currency)
    .bind(&payload.shipping_address)
    .bind(&payload.payment_method)
    .fetch_one(pool)
    .await?;

    let mut items = Vec::with_capacity(cart.items.len());
    for cart_item in &cart.items {
        let item = sqlx::query_as::<_, OrderItem>(
            "INSERT INTO order_items
                 (id, order_id, product_id, product_name, quantity, unit_price, total_price)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(order.id)
        .bind(cart_item.product_id)
        .bind(&cart_item.product_name)
        .bind(cart_item.quantity)
        .bind(cart_item.unit_price)
        .bind(cart_item.total_price)
        .fetch_one(pool)
        .await?;
        items.push(item);
    }

    cart_service::clear_cart(pool, user.user_id).await?;

    tracing::info!(order_id = %order.id, user_id = %user.user_id, "order created");
    Ok(ApiResponse::success(
        "Order created",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let items = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.user_id)
    .fetch_all(pool)
    .await?;

    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("OK", OrderList { items }, Some(meta)))
}

fn build_invoice_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.to_string();
    let short = &suffix[..8];
    format!("INV-{date}-{short}")
}
