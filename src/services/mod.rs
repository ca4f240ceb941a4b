pub mod auth_service;
pub mod cart_service;
pub mod order_service;
pub mod payment;
pub mod product_service;
pub mod recommendation_service;
pub mod review_service;
