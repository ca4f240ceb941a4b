use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
pub mod recommendations;
pub mod reviews;
pub mod search;
pub mod tracking;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/products", products::router())
        .merge(products::categories_router())
        .nest("/cart", cart::router())
        .nest("/payments", payments::router())
        .nest("/tracking", tracking::router())
        .nest("/recommendations", recommendations::router())
        .nest("/search", search::router())
        .nest("/auth", auth::router())
        .nest("/orders", orders::router())
        .nest("/reviews", reviews::router())
}
