use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddCartItemRequest, CreateCartRequest, UpdateCartItemRequest},
    error::AppResult,
    models::Cart,
    response::{ApiResponse, Meta},
    services::{cart_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_cart))
        .route("/{user_id}", get(get_cart))
        .route("/{user_id}/items", post(add_item))
        .route("/{user_id}/items/{product_id}", put(update_item))
        .route("/{user_id}/items/{product_id}", delete(remove_item))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = CreateCartRequest,
    responses(
        (status = 200, description = "Existing or newly created cart", body = ApiResponse<Cart>)
    ),
    tag = "Cart"
)]
pub async fn create_cart(
    State(state): State<AppState>,
    Json(payload): Json<CreateCartRequest>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let cart = cart_service::get_or_create_cart(&state.pool, payload.user_id).await?;
    Ok(Json(ApiResponse::success("Cart", cart, Some(Meta::empty()))))
}

#[utoipa::path(
    get,
    path = "/api/cart/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User cart, created when absent", body = ApiResponse<Cart>)
    ),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let cart = cart_service::get_or_create_cart(&state.pool, user_id).await?;
    Ok(Json(ApiResponse::success("Cart", cart, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/cart/{user_id}/items",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Cart after adding the item", body = ApiResponse<Cart>),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    // Snapshot source; item prices are captured from this row at add time.
    let product = product_service::get_product(&state.pool, payload.product_id).await?;
    let cart = cart_service::add_item(
        &state.pool,
        user_id,
        payload.product_id,
        payload.quantity,
        &product,
    )
    .await?;
    Ok(Json(ApiResponse::success("Item added", cart, Some(Meta::empty()))))
}

#[utoipa::path(
    put,
    path = "/api/cart/{user_id}/items/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("product_id" = Uuid, Path, description = "Product ID"),
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Cart after the update", body = ApiResponse<Cart>),
        (status = 404, description = "Cart or item not found"),
    ),
    tag = "Cart"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let cart =
        cart_service::update_item_quantity(&state.pool, user_id, product_id, payload.quantity)
            .await?;
    Ok(Json(ApiResponse::success("Item updated", cart, Some(Meta::empty()))))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{user_id}/items/{product_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("product_id" = Uuid, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Cart after removal", body = ApiResponse<Cart>),
        (status = 404, description = "Cart or item not found"),
    ),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    Path((user_id, product_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let cart = cart_service::remove_item(&state.pool, user_id, product_id).await?;
    Ok(Json(ApiResponse::success("Item removed", cart, Some(Meta::empty()))))
}
