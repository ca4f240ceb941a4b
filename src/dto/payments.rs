use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{CryptoPaymentDetails, Customer, PaymentMethod, PaymentStatus};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub customer: Customer,
    pub payment_method: PaymentMethod,
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub crypto_payment: Option<CryptoPaymentDetails>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Adapter-boundary response. Gateway failures are expressed as a `failed`
/// status here, never as an error.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub id: String,
    pub status: PaymentStatus,
    pub payment_link: Option<String>,
    pub crypto_address: Option<String>,
    pub qr_code: Option<String>,
    pub message: String,
    #[schema(value_type = Object)]
    pub provider_response: serde_json::Value,
}

impl PaymentResponse {
    pub fn failed(message: impl Into<String>, provider_response: serde_json::Value) -> Self {
        Self {
            id: String::new(),
            status: PaymentStatus::Failed,
            payment_link: None,
            crypto_address: None,
            qr_code: None,
            message: message.into(),
            provider_response,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerificationResult {
    pub status: PaymentStatus,
    pub message: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyQuery {
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupportedCryptocurrency {
    pub symbol: String,
    pub name: String,
    pub rate_usd: f64,
    pub network: String,
    pub min_confirmations: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupportedCryptocurrencies {
    pub cryptocurrencies: Vec<SupportedCryptocurrency>,
}
