use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddCartItemRequest, CreateCartRequest, UpdateCartItemRequest},
        orders::{CreateOrderRequest, OrderList, OrderWithItems},
        payments::{
            PaymentRequest, PaymentResponse, SupportedCryptocurrencies, SupportedCryptocurrency,
            VerificationResult,
        },
        products::{CategoryList, CategorySummary, ProductList, SearchResults},
        recommendations::{RecommendationList, RecommendedProduct},
        reviews::CreateReviewRequest,
        tracking::TrackEventRequest,
    },
    models::{
        Cart, CartItem, CartSummary, CryptoPaymentDetails, Customer, Order, OrderItem, Payment,
        PaymentMethod, PaymentStatus, Product, ProductImage, ProductVariant, Review, SupplierInfo,
        TrackingEvent, User, UserBehavior,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, cart, health, orders, payments, products as product_routes, recommendations,
        reviews, search, tracking,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::list_categories,
        search::search,
        cart::create_cart,
        cart::get_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        payments::initialize_payment,
        payments::verify_payment,
        payments::flutterwave_webhook,
        payments::supported_cryptocurrencies,
        tracking::track_event,
        recommendations::user_recommendations,
        recommendations::session_recommendations,
        orders::create_order,
        orders::list_orders,
        reviews::create_review
    ),
    components(
        schemas(
            User,
            Product,
            ProductImage,
            ProductVariant,
            SupplierInfo,
            ProductList,
            CategorySummary,
            CategoryList,
            SearchResults,
            Cart,
            CartItem,
            CartSummary,
            CreateCartRequest,
            AddCartItemRequest,
            UpdateCartItemRequest,
            Customer,
            CryptoPaymentDetails,
            PaymentMethod,
            PaymentStatus,
            PaymentRequest,
            PaymentResponse,
            Payment,
            VerificationResult,
            SupportedCryptocurrency,
            SupportedCryptocurrencies,
            TrackEventRequest,
            TrackingEvent,
            UserBehavior,
            RecommendedProduct,
            RecommendationList,
            CreateOrderRequest,
            Order,
            OrderItem,
            OrderList,
            OrderWithItems,
            CreateReviewRequest,
            Review,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Cart>,
            ApiResponse<PaymentResponse>,
            ApiResponse<RecommendationList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Search", description = "Full-text product search"),
        (name = "Cart", description = "Shopping cart endpoints"),
        (name = "Payments", description = "Payment gateway endpoints"),
        (name = "Tracking", description = "Behavior tracking endpoints"),
        (name = "Recommendations", description = "Recommendation endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Reviews", description = "Review endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
