use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::reviews::CreateReviewRequest,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
};

pub async fn create_review(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 1 and 5".to_string(),
        ));
    }

    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(pool)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let review = sqlx::query_as::<_, Review>(
        "INSERT INTO reviews (id, product_id, user_id, rating, comment)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.product_id)
    .bind(user.user_id)
    .bind(payload.rating)
    .bind(&payload.comment)
    .fetch_one(pool)
    .await?;

    // Running average; review_count is the divisor before this insert.
    sqlx::query(
        "UPDATE products
         SET rating = (rating * review_count + $2) / (review_count + 1),
             review_count = review_count + 1,
             updated_at = now()
         WHERE id = $1",
    )
    .bind(payload.product_id)
    .bind(f64::from(payload.rating))
    .execute(pool)
    .await?;

    Ok(ApiResponse::success(
        "Review created",
        review,
        Some(Meta::empty()),
    ))
}
