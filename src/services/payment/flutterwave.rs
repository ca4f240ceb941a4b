use std::time::Duration;

use hmac::{Hmac, Mac};
use rand::Rng;
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use crate::{
    config::FlutterwaveConfig,
    dto::payments::{PaymentRequest, PaymentResponse, VerificationResult},
    models::PaymentStatus,
};

use super::PaymentGateway;

type HmacSha256 = Hmac<Sha256>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Card/bank/ussd/mobile-money gateway. Mock or live is decided once from
/// config; callers never see the difference.
#[derive(Clone)]
pub enum FlutterwaveGateway {
    Mock(MockFlutterwave),
    Live(LiveFlutterwave),
}

impl FlutterwaveGateway {
    pub fn from_config(config: &FlutterwaveConfig, frontend_url: &str) -> Self {
        if config.mock {
            Self::Mock(MockFlutterwave)
        } else {
            Self::Live(LiveFlutterwave::new(config, frontend_url))
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
}

#[derive(Clone)]
pub struct MockFlutterwave;

impl PaymentGateway for MockFlutterwave {
    async fn initialize(&self, _request: &PaymentRequest) -> PaymentResponse {
        let id = Uuid::new_v4();
        let link = format!(
            "https://checkout.flutterwave.com/v3/hosted/pay/mock_{}",
            Uuid::new_v4()
        );
        PaymentResponse {
            id: id.to_string(),
            status: PaymentStatus::Pending,
            payment_link: Some(link.clone()),
            crypto_address: None,
            qr_code: None,
            message: "Mock payment initialized successfully".to_string(),
            provider_response: json!({
                "status": "success",
                "message": "Mock payment initialized",
                "data": {
                    "id": Uuid::new_v4().to_string(),
                    "tx_ref": format!("mock_tx_{}", Uuid::new_v4()),
                    "link": link,
                }
            }),
        }
    }

    async fn verify(&self, transaction_id: &str) -> VerificationResult {
        let status = if transaction_id == "test_success" {
            PaymentStatus::Successful
        } else {
            let outcomes = [
                PaymentStatus::Successful,
                PaymentStatus::Failed,
                PaymentStatus::Pending,
            ];
            outcomes[rand::rng().random_range(0..outcomes.len())]
        };

        VerificationResult {
            status,
            message: format!("Mock verification - {}", status.as_str()),
            data: json!({
                "id": transaction_id,
                "tx_ref": format!("mock_tx_{transaction_id}"),
                "amount": 100.0,
                "currency": "USD",
                "status": status.as_str(),
                "customer": {
                    "email": "test@example.com",
                    "name": "Test User"
                }
            }),
        }
    }

    fn verify_webhook(&self, _payload: &[u8], _signature: &str) -> bool {
        true
    }
}

#[derive(Clone)]
pub struct LiveFlutterwave {
    client: reqwest::Client,
    secret_key: String,
    secret_hash: String,
    base_url: String,
    redirect_url: String,
}

impl LiveFlutterwave {
    fn new(config: &FlutterwaveConfig, frontend_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            secret_key: config.secret_key.clone(),
            secret_hash: config.secret_hash.clone(),
            base_url: config.base_url.clone(),
            redirect_url: format!("{frontend_url}/payment/callback"),
        }
    }
}

impl PaymentGateway for LiveFlutterwave {
    async fn initialize(&self, request: &PaymentRequest) -> PaymentResponse {
        let tx_ref = format!(
            "tx_{}_{}",
            request.customer.email,
            chrono::Utc::now().timestamp()
        );
        let payload = json!({
            "tx_ref": tx_ref,
            "amount": request.amount,
            "currency": request.currency,
            "redirect_url": self.redirect_url,
            "payment_options": "card,banktransfer,ussd,mobilemoney",
            "customer": {
                "email": request.customer.email,
                "phonenumber": request.customer.phone.as_deref().unwrap_or("+1234567890"),
                "name": request.customer.name,
            },
            "customizations": {
                "title": "Marketplace Payment",
                "description": request.description.as_deref().unwrap_or("Product purchase"),
            },
            "meta": request.metadata,
        });

        let result = self
            .client
            .post(format!("{}/payments", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                let body: serde_json::Value = match response.json().await {
                    Ok(body) => body,
                    Err(err) => {
                        tracing::error!(error = %err, "flutterwave response decode failed");
                        return PaymentResponse::failed(
                            format!("Service error: {err}"),
                            json!({}),
                        );
                    }
                };
                if body["status"] == "success" {
                    PaymentResponse {
                        id: body["data"]["id"].to_string().trim_matches('"').to_string(),
                        status: PaymentStatus::Pending,
                        payment_link: body["data"]["link"].as_str().map(str::to_string),
                        crypto_address: None,
                        qr_code: None,
                        message: "Payment initialized successfully".to_string(),
                        provider_response: body,
                    }
                } else {
                    tracing::error!(body = %body, "flutterwave rejected payment");
                    PaymentResponse::failed("Payment initialization failed", body)
                }
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, body, "flutterwave API error");
                PaymentResponse::failed(
                    "Payment initialization failed",
                    json!({ "status": status.as_u16(), "body": body }),
                )
            }
            Err(err) => {
                tracing::error!(error = %err, "flutterwave request failed");
                PaymentResponse::failed(format!("Service error: {err}"), json!({}))
            }
        }
    }

    async fn verify(&self, transaction_id: &str) -> VerificationResult {
        // Single synchronous check; no retry or polling.
        let result = self
            .client
            .get(format!(
                "{}/transactions/{}/verify",
                self.base_url, transaction_id
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<serde_json::Value>().await {
                    Ok(body) => {
                        let status = match body["data"]["status"].as_str() {
                            Some("successful") => PaymentStatus::Successful,
                            Some("failed") => PaymentStatus::Failed,
                            _ => PaymentStatus::Pending,
                        };
                        VerificationResult {
                            status,
                            message: "Verification complete".to_string(),
                            data: body,
                        }
                    }
                    Err(err) => VerificationResult {
                        status: PaymentStatus::Failed,
                        message: format!("Verification failed: {err}"),
                        data: json!({}),
                    },
                }
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%status, body, "payment verification failed");
                VerificationResult {
                    status: PaymentStatus::Failed,
                    message: "Verification failed".to_string(),
                    data: json!({ "status": status.as_u16(), "body": body }),
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "payment verification request failed");
                VerificationResult {
                    status: PaymentStatus::Failed,
                    message: format!("Verification failed: {err}"),
                    data: json!({}),
                }
            }
        }
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> bool {
        verify_hmac_signature(self.secret_hash.as_bytes(), payload, signature)
    }
}

/// Constant-time HMAC-SHA256 check of a hex-encoded signature.
pub fn verify_hmac_signature(secret: &[u8], payload: &[u8], signature: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);

    let Some(provided) = decode_hex(signature) else {
        return false;
    };
    mac.verify_slice(&provided).is_ok()
}

fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }
    (0..input.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(input.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Hex-encode an HMAC-SHA256 digest; used by tests and webhook senders.
pub fn sign_payload(secret: &[u8], payload: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload);
    let digest = mac.finalize().into_bytes();
    Some(digest.iter().map(|b| format!("{b:02x}")).collect())
}
