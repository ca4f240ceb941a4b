use marketplace_api::routes::doc::ApiDoc;
use utoipa::OpenApi;

#[test]
fn openapi_documents_every_route() {
    let doc = ApiDoc::openapi();
    for path in [
        "/health",
        "/api/auth/register",
        "/api/auth/login",
        "/api/products",
        "/api/products/{id}",
        "/api/categories",
        "/api/search",
        "/api/cart/{user_id}/items",
        "/api/payments/initialize",
        "/api/payments/verify/{transaction_id}",
        "/api/payments/webhook/flutterwave",
        "/api/payments/crypto/supported",
        "/api/tracking/event",
        "/api/recommendations/{user_id}",
        "/api/orders",
        "/api/reviews",
    ] {
        assert!(
            doc.paths.paths.contains_key(path),
            "missing documented path {path}"
        );
    }
}

#[test]
fn openapi_registers_persisted_models() {
    let doc = ApiDoc::openapi();
    let components = doc.components.expect("components");
    for name in ["Product", "Cart", "Payment", "TrackingEvent", "UserBehavior", "Order"] {
        assert!(
            components.schemas.contains_key(name),
            "missing schema {name}"
        );
    }
}
