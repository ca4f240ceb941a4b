use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub url: String,
    pub alt: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductVariant {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub price_adjustment: f64,
}

/// Supplier snapshot copied from catalog data; `trade_assurance` is
/// catalog metadata, not computed here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SupplierInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub verification_status: bool,
    #[serde(default)]
    pub trade_assurance: bool,
    #[serde(default)]
    pub response_rate: f64,
    #[serde(default)]
    pub rating: f64,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub subcategory: String,
    #[schema(value_type = Vec<ProductImage>)]
    pub images: Json<Vec<ProductImage>>,
    pub min_price: f64,
    pub max_price: f64,
    pub currency: String,
    #[schema(value_type = Vec<Object>)]
    pub bulk_pricing: Json<Vec<serde_json::Value>>,
    pub min_order_quantity: i32,
    #[schema(value_type = SupplierInfo)]
    pub supplier: Json<SupplierInfo>,
    #[schema(value_type = Vec<ProductVariant>)]
    pub variants: Json<Vec<ProductVariant>>,
    #[schema(value_type = Object)]
    pub specifications: Json<serde_json::Value>,
    pub tags: Vec<String>,
    pub status: String,
    pub view_count: i32,
    pub inquiry_count: i32,
    pub rating: f64,
    pub review_count: i32,
    pub last_viewed: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const PRODUCT_STATUS_ACTIVE: &str = "active";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartSummary {
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,
    pub currency: String,
    pub item_count: i32,
}

impl CartSummary {
    pub fn empty() -> Self {
        Self {
            subtotal: 0.0,
            tax: 0.0,
            shipping: 0.0,
            total: 0.0,
            currency: "USD".to_string(),
            item_count: 0,
        }
    }
}

/// Snapshot of a product at add-to-cart time. Price and supplier fields are
/// captured once and never refreshed from the catalog.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_image: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
    pub currency: String,
    pub supplier_id: String,
    pub supplier_name: String,
    #[schema(value_type = Vec<ProductVariant>)]
    pub variants: Json<Vec<ProductVariant>>,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub summary: CartSummary,
    pub is_persistent: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Crypto,
    BankTransfer,
    MobileMoney,
    Ussd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Successful,
    Failed,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Successful => "successful",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CryptoAsset {
    Bitcoin,
    Ethereum,
    Usdt,
    Usdc,
}

impl CryptoAsset {
    pub const ALL: [CryptoAsset; 4] = [
        CryptoAsset::Bitcoin,
        CryptoAsset::Ethereum,
        CryptoAsset::Usdt,
        CryptoAsset::Usdc,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            CryptoAsset::Bitcoin => "BTC",
            CryptoAsset::Ethereum => "ETH",
            CryptoAsset::Usdt => "USDT",
            CryptoAsset::Usdc => "USDC",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CryptoAsset::Bitcoin => "Bitcoin",
            CryptoAsset::Ethereum => "Ethereum",
            CryptoAsset::Usdt => "Usdt",
            CryptoAsset::Usdc => "Usdc",
        }
    }

    pub fn is_stablecoin(&self) -> bool {
        matches!(self, CryptoAsset::Usdt | CryptoAsset::Usdc)
    }

    pub fn usd_rate(&self) -> f64 {
        match self {
            CryptoAsset::Bitcoin => 45_000.0,
            CryptoAsset::Ethereum => 3_000.0,
            CryptoAsset::Usdt | CryptoAsset::Usdc => 1.0,
        }
    }

    pub fn required_confirmations(&self) -> u32 {
        match self {
            CryptoAsset::Bitcoin => 3,
            _ => 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub email: String,
    pub phone: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CryptoPaymentDetails {
    pub crypto_method: CryptoAsset,
    pub wallet_address: Option<String>,
    #[serde(default = "default_network")]
    pub network: String,
    pub gas_fee: Option<f64>,
}

fn default_network() -> String {
    "mainnet".to_string()
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub tx_ref: String,
    pub amount: f64,
    pub currency: String,
    #[schema(value_type = Customer)]
    pub customer: Json<Customer>,
    pub payment_method: String,
    pub provider: String,
    pub status: String,
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub metadata: Json<serde_json::Value>,
    #[schema(value_type = Option<CryptoPaymentDetails>)]
    pub crypto: Option<Json<CryptoPaymentDetails>>,
    pub provider_tx_id: Option<String>,
    #[schema(value_type = Object)]
    pub provider_response: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Append-only analytics event. Never mutated after insert.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct TrackingEvent {
    pub id: Uuid,
    pub session_id: String,
    pub user_id: Option<Uuid>,
    pub event_type: String,
    pub page_url: String,
    #[schema(value_type = Object)]
    pub properties: Json<serde_json::Value>,
    #[schema(value_type = Object)]
    pub metadata: Json<serde_json::Value>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct ProductInteraction {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_id: String,
    pub interaction_type: String,
    pub duration: Option<f64>,
    pub occurred_at: DateTime<Utc>,
}

/// Derived per-user aggregate, safe to rebuild from the interaction log.
#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct UserBehavior {
    pub user_id: Uuid,
    pub total_page_views: i32,
    pub total_product_views: i32,
    pub total_searches: i32,
    pub favorite_categories: Vec<String>,
    pub behavior_score: f64,
    pub last_seen: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecommendationScore {
    pub product_id: Uuid,
    pub score: f64,
    pub reasons: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub invoice_number: String,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub total: f64,
    pub currency: String,
    pub status: String,
    pub shipping_address: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub total_price: f64,
}

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
