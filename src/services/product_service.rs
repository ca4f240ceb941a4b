use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::products::{CategoryList, CategorySummary, ProductQuery},
    error::{AppError, AppResult},
    models::{Product, PRODUCT_STATUS_ACTIVE},
};

/// Filtered catalog listing. Only active products are visible here.
pub async fn list_products(pool: &DbPool, query: &ProductQuery) -> AppResult<Vec<Product>> {
    let (limit, skip) = query.normalize();

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT * FROM products WHERE status = ");
    builder.push_bind(PRODUCT_STATUS_ACTIVE);

    if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
        builder.push(" AND category = ").push_bind(category);
    }
    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        builder
            .push(" AND to_tsvector('english', name || ' ' || description) @@ plainto_tsquery('english', ")
            .push_bind(search)
            .push(")");
    }
    if let Some(min_price) = query.min_price {
        builder.push(" AND min_price >= ").push_bind(min_price);
    }
    if let Some(max_price) = query.max_price {
        builder.push(" AND max_price <= ").push_bind(max_price);
    }

    builder.push(" ORDER BY created_at DESC");
    builder.push(" LIMIT ").push_bind(limit);
    builder.push(" OFFSET ").push_bind(skip);

    let products = builder
        .build_query_as::<Product>()
        .fetch_all(pool)
        .await?;
    Ok(products)
}

pub async fn get_product(pool: &DbPool, id: Uuid) -> AppResult<Product> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    product.ok_or(AppError::NotFound)
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    category: String,
    count: i64,
    subcategories: Vec<String>,
}

/// Category roll-up: product count and distinct subcategories per category,
/// busiest first.
pub async fn list_categories(pool: &DbPool) -> AppResult<CategoryList> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT category, COUNT(*) AS count,
                ARRAY_AGG(DISTINCT subcategory) AS subcategories
         FROM products
         GROUP BY category
         ORDER BY count DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(CategoryList {
        categories: rows
            .into_iter()
            .map(|row| CategorySummary {
                name: row.category,
                count: row.count,
                subcategories: row.subcategories,
            })
            .collect(),
    })
}

/// Full-text product search, active products only.
pub async fn search_products(pool: &DbPool, q: &str, limit: i64) -> AppResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products
         WHERE to_tsvector('english', name || ' ' || description)
                   @@ plainto_tsquery('english', $1)
           AND status = $2
         LIMIT $3",
    )
    .bind(q)
    .bind(PRODUCT_STATUS_ACTIVE)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

/// Batch fetch preserving no particular order; callers map by id.
pub async fn get_products_by_ids(pool: &DbPool, ids: &[Uuid]) -> AppResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(products)
}
