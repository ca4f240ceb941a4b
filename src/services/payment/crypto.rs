use std::time::Duration;

use rand::Rng;
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::CryptoConfig,
    dto::payments::{
        PaymentRequest, PaymentResponse, SupportedCryptocurrencies, SupportedCryptocurrency,
        VerificationResult,
    },
    models::{CryptoAsset, PaymentStatus},
};

use super::{PaymentGateway, flutterwave::verify_hmac_signature};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Confirmation threshold used when verifying without knowing the asset.
const DEFAULT_REQUIRED_CONFIRMATIONS: u32 = 3;

const STABLECOIN_DECIMALS: i32 = 6;
const VOLATILE_DECIMALS: i32 = 8;

pub fn round_dp(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Fiat-to-crypto conversion: 1:1 for stablecoins (6 dp), static exchange
/// rate for volatile assets (8 dp).
pub fn convert_to_crypto(amount: f64, asset: CryptoAsset) -> f64 {
    if asset.is_stablecoin() {
        round_dp(amount, STABLECOIN_DECIMALS)
    } else {
        round_dp(amount / asset.usd_rate(), VOLATILE_DECIMALS)
    }
}

fn mock_address(asset: CryptoAsset) -> &'static str {
    match asset {
        CryptoAsset::Bitcoin => "1A1B2C3D4E5F6G7H8I9J0K1L2M3N4O5P6Q",
        CryptoAsset::Ethereum | CryptoAsset::Usdt | CryptoAsset::Usdc => {
            "0x742d35cc6bb0F70b36c5C5a85482600ae78dE0DE"
        }
    }
}

#[derive(Clone)]
pub enum CryptoGateway {
    Mock(MockCryptoGateway),
    Live(LiveCryptoGateway),
}

impl CryptoGateway {
    pub fn from_config(config: &CryptoConfig) -> Self {
        if config.mock {
            Self::Mock(MockCryptoGateway)
        } else {
            Self::Live(LiveCryptoGateway::new(config))
        }
    }

    pub async fn initialize(&self, request: &PaymentRequest) -> PaymentResponse {
        match self {
            Self::Mock(gateway) => gateway.initialize(request).await,
            Self::Live(gateway) => gateway.initialize(request).await,
        }
    }

    pub async fn verify(&self, transaction_id: &str) -> VerificationResult {
        match self {
            Self::Mock(gateway) => gateway.verify(transaction_id).await,
            Self::Live(gateway) => gateway.verify(transaction_id).await,
        }
    }

    pub fn verify_webhook(&self, payload: &[u8], signature: &str) -> bool {
        match self {
            Self::Mock(gateway) => PaymentGateway::verify_webhook(gateway, payload, signature),
            Self::Live(gateway) => PaymentGateway::verify_webhook(gateway, payload, signature),
        }
    }

    pub fn supported(&self) -> SupportedCryptocurrencies {
        let network = if matches!(self, Self::Mock(_)) {
            "testnet"
        } else {
            "mainnet"
        };
        SupportedCryptocurrencies {
            cryptocurrencies: CryptoAsset::ALL
                .iter()
                .map(|asset| SupportedCryptocurrency {
                    symbol: asset.symbol().to_string(),
                    name: asset.display_name().to_string(),
                    rate_usd: asset.usd_rate(),
                    network: network.to_string(),
                    min_confirmations: asset.required_confirmations(),
                })
                .collect(),
        }
    }
}

fn requested_asset(request: &PaymentRequest) -> Option<CryptoAsset> {
    request.crypto_payment.as_ref().map(|c| c.crypto_method)
}

#[derive(Clone)]
pub struct MockCryptoGateway;

impl PaymentGateway for MockCryptoGateway {
    async fn initialize(&self, request: &PaymentRequest) -> PaymentResponse {
        let Some(asset) = requested_asset(request) else {
            return PaymentResponse::failed("Crypto payment details required", json!({}));
        };

        let crypto_amount = convert_to_crypto(request.amount, asset);
        let wallet_address = mock_address(asset);

        PaymentResponse {
            id: format!("mock_crypto_{}", Uuid::new_v4()),
            status: PaymentStatus::Pending,
            payment_link: None,
            crypto_address: Some(wallet_address.to_string()),
            qr_code: Some(format!(
                "data:image/png;base64,mock_qr_code_for_{}",
                asset.symbol().to_lowercase()
            )),
            message: format!(
                "Mock: Send {crypto_amount} {} to the address",
                asset.symbol()
            ),
            provider_response: json!({
                "crypto_amount": crypto_amount,
                "wallet_address": wallet_address,
                "network": "testnet",
                "confirmations_required": 1,
                "estimated_confirmation_time": "5-10 minutes"
            }),
        }
    }

    async fn verify(&self, transaction_id: &str) -> VerificationResult {
        let mut rng = rand::rng();
        let confirmations: u32 = rng.random_range(0..=15);
        let required = DEFAULT_REQUIRED_CONFIRMATIONS;

        let status = if confirmations >= required {
            PaymentStatus::Successful
        } else {
            PaymentStatus::Pending
        };
        let chain_status = if confirmations >= required {
            "confirmed"
        } else {
            "pending"
        };

        VerificationResult {
            status,
            message: format!("Mock verification - {chain_status}"),
            data: json!({
                "transaction_id": transaction_id,
                "confirmations": confirmations,
                "required_confirmations": required,
                "status": chain_status,
                "block_height": rng.random_range(800_000..850_000),
                "gas_fee": rng.random_range(0.001..0.01),
                "network": "testnet"
            }),
        }
    }

    fn verify_webhook(&self, _payload: &[u8], _signature: &str) -> bool {
        true
    }
}

#[derive(Clone)]
pub struct LiveCryptoGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl LiveCryptoGateway {
    fn new(config: &CryptoConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        }
    }
}

impl PaymentGateway for LiveCryptoGateway {
    async fn initialize(&self, request: &PaymentRequest) -> PaymentResponse {
        let Some(asset) = requested_asset(request) else {
            return PaymentResponse::failed("Crypto payment details required", json!({}));
        };

        let crypto_amount = convert_to_crypto(request.amount, asset);
        let payload = json!({
            "asset": asset.symbol(),
            "amount": crypto_amount,
            "fiat_amount": request.amount,
            "fiat_currency": request.currency,
        });

        let result = self
            .client
            .post(format!("{}/payment-addresses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<serde_json::Value>().await {
                    Ok(body) => {
                        let wallet_address = body["data"]["address"]
                            .as_str()
                            .unwrap_or_default()
                            .to_string();
                        PaymentResponse {
                            id: format!(
                                "crypto_{}_{}",
                                asset.symbol().to_lowercase(),
                                chrono::Utc::now().timestamp()
                            ),
                            status: PaymentStatus::Pending,
                            payment_link: None,
                            crypto_address: Some(wallet_address.clone()),
                            qr_code: Some(format!(
                                "data:image/png;base64,qr_code_for_{wallet_address}_{crypto_amount}"
                            )),
                            message: format!(
                                "Send {crypto_amount} {} to the provided address",
                                asset.symbol()
                            ),
                            provider_response: json!({
                                "crypto_amount": crypto_amount,
                                "wallet_address": wallet_address,
                                "network": "mainnet",
                                "confirmations_required": asset.required_confirmations(),
                                "raw": body,
                            }),
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "crypto gateway decode failed");
                        PaymentResponse::failed(
                            format!("Crypto payment initialization failed: {err}"),
                            json!({}),
                        )
                    }
                }
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, body, "crypto gateway error");
                PaymentResponse::failed(
                    "Crypto payment initialization failed",
                    json!({ "status": status.as_u16(), "body": body }),
                )
            }
            Err(err) => {
                tracing::error!(error = %err, "crypto payment initialization error");
                PaymentResponse::failed(
                    format!("Crypto payment initialization failed: {err}"),
                    json!({}),
                )
            }
        }
    }

    async fn verify(&self, transaction_id: &str) -> VerificationResult {
        // Direct passthrough query; one synchronous check, no polling.
        let result = self
            .client
            .get(format!("{}/transactions/{}", self.base_url, transaction_id))
            .bearer_auth(&self.api_key)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<serde_json::Value>().await {
                    Ok(body) => {
                        let confirmations =
                            body["data"]["confirmations"].as_u64().unwrap_or(0) as u32;
                        let status = if confirmations >= DEFAULT_REQUIRED_CONFIRMATIONS {
                            PaymentStatus::Successful
                        } else {
                            PaymentStatus::Pending
                        };
                        VerificationResult {
                            status,
                            message: "Verification complete".to_string(),
                            data: body,
                        }
                    }
                    Err(err) => VerificationResult {
                        status: PaymentStatus::Failed,
                        message: format!("Crypto payment verification error: {err}"),
                        data: json!({}),
                    },
                }
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, body, "crypto verification failed");
                VerificationResult {
                    status: PaymentStatus::Failed,
                    message: "Verification failed".to_string(),
                    data: json!({ "status": status.as_u16(), "body": body }),
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "crypto verification request failed");
                VerificationResult {
                    status: PaymentStatus::Failed,
                    message: format!("Crypto payment verification error: {err}"),
                    data: json!({}),
                }
            }
        }
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> bool {
        verify_hmac_signature(self.api_key.as_bytes(), payload, signature)
    }
}
