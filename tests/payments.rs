use marketplace_api::{
    config::{CryptoConfig, FlutterwaveConfig},
    dto::payments::PaymentRequest,
    models::{CryptoAsset, Customer, CryptoPaymentDetails, PaymentMethod, PaymentStatus},
    services::payment::{
        crypto::{CryptoGateway, convert_to_crypto, round_dp},
        flutterwave::{FlutterwaveGateway, sign_payload, verify_hmac_signature},
    },
};
use serde_json::json;

fn mock_flutterwave() -> FlutterwaveGateway {
    FlutterwaveGateway::from_config(
        &FlutterwaveConfig {
            secret_key: "FLWSECK_TEST-mock-key".into(),
            secret_hash: "hash".into(),
            base_url: "https://api.flutterwave.com/v3".into(),
            mock: true,
        },
        "http://localhost:3000",
    )
}

fn mock_crypto() -> CryptoGateway {
    CryptoGateway::from_config(&CryptoConfig {
        api_key: "mock-crypto-key".into(),
        base_url: "https://api.coinbase.com/v2".into(),
        mock: true,
    })
}

fn card_request() -> PaymentRequest {
    PaymentRequest {
        amount: 150.0,
        currency: "USD".into(),
        customer: Customer {
            email: "buyer@example.com".into(),
            phone: None,
            name: "Buyer".into(),
        },
        payment_method: PaymentMethod::Card,
        description: Some("Bulk order".into()),
        metadata: json!({}),
        crypto_payment: None,
    }
}

fn crypto_request(asset: CryptoAsset) -> PaymentRequest {
    PaymentRequest {
        payment_method: PaymentMethod::Crypto,
        crypto_payment: Some(CryptoPaymentDetails {
            crypto_method: asset,
            wallet_address: None,
            network: "mainnet".into(),
            gas_fee: None,
        }),
        ..card_request()
    }
}

#[test]
fn round_dp_truncates_to_requested_precision() {
    assert_eq!(round_dp(0.123456789, 6), 0.123457);
    assert_eq!(round_dp(0.123456789, 8), 0.12345679);
    assert_eq!(round_dp(45.0, 2), 45.0);
}

#[test]
fn stablecoins_convert_one_to_one() {
    assert_eq!(convert_to_crypto(123.456789, CryptoAsset::Usdt), 123.456789);
    assert_eq!(convert_to_crypto(50.0, CryptoAsset::Usdc), 50.0);
}

#[test]
fn volatile_assets_convert_by_rate() {
    assert_eq!(convert_to_crypto(3000.0, CryptoAsset::Ethereum), 1.0);
    assert_eq!(convert_to_crypto(45000.0, CryptoAsset::Bitcoin), 1.0);
    assert_eq!(convert_to_crypto(100.0, CryptoAsset::Bitcoin), 0.00222222);
}

#[tokio::test]
async fn mock_flutterwave_initialize_returns_checkout_link() {
    let response = mock_flutterwave().initialize(&card_request()).await;
    assert_eq!(response.status, PaymentStatus::Pending);
    assert!(!response.id.is_empty());
    let link = response.payment_link.expect("payment link");
    assert!(link.starts_with("https://checkout.flutterwave.com/"));
    assert!(response.crypto_address.is_none());
}

#[tokio::test]
async fn mock_flutterwave_verify_honors_test_success() {
    let result = mock_flutterwave().verify("test_success").await;
    assert_eq!(result.status, PaymentStatus::Successful);
    assert_eq!(result.data["id"], "test_success");
}

#[tokio::test]
async fn mock_crypto_initialize_returns_address_and_qr() {
    let response = mock_crypto().initialize(&crypto_request(CryptoAsset::Bitcoin)).await;
    assert_eq!(response.status, PaymentStatus::Pending);
    assert!(response.id.starts_with("mock_crypto_"));
    assert!(response.crypto_address.is_some());
    assert!(response.qr_code.is_some());
    assert_eq!(response.provider_response["network"], "testnet");
}

#[tokio::test]
async fn mock_crypto_initialize_without_details_fails() {
    let request = PaymentRequest {
        payment_method: PaymentMethod::Crypto,
        ..card_request()
    };
    let response = mock_crypto().initialize(&request).await;
    assert_eq!(response.status, PaymentStatus::Failed);
}

#[tokio::test]
async fn mock_crypto_verify_is_pending_or_successful() {
    let result = mock_crypto().verify("some-tx").await;
    assert!(matches!(
        result.status,
        PaymentStatus::Pending | PaymentStatus::Successful
    ));
    let confirmations = result.data["confirmations"].as_u64().expect("confirmations");
    assert!(confirmations <= 15);
    assert_eq!(result.data["required_confirmations"], 3);
}

#[test]
fn supported_cryptocurrencies_list_all_assets() {
    let supported = mock_crypto().supported();
    assert_eq!(supported.cryptocurrencies.len(), 4);

    let btc = supported
        .cryptocurrencies
        .iter()
        .find(|c| c.symbol == "BTC")
        .expect("BTC entry");
    assert_eq!(btc.rate_usd, 45_000.0);
    assert_eq!(btc.min_confirmations, 3);
    assert_eq!(btc.network, "testnet");

    let eth = supported
        .cryptocurrencies
        .iter()
        .find(|c| c.symbol == "ETH")
        .expect("ETH entry");
    assert_eq!(eth.min_confirmations, 12);
}

#[test]
fn mock_gateways_accept_any_webhook() {
    assert!(mock_flutterwave().verify_webhook(b"{}", "whatever"));
    assert!(mock_crypto().verify_webhook(b"{}", "whatever"));
}

#[test]
fn hmac_signature_roundtrip() {
    let secret = b"webhook-secret";
    let payload = br#"{"event":"charge.completed"}"#;

    let signature = sign_payload(secret, payload).expect("signature");
    assert!(verify_hmac_signature(secret, payload, &signature));
}

#[test]
fn hmac_signature_rejects_tampering() {
    let secret = b"webhook-secret";
    let payload = br#"{"event":"charge.completed"}"#;
    let signature = sign_payload(secret, payload).expect("signature");

    assert!(!verify_hmac_signature(secret, b"{}", &signature));
    assert!(!verify_hmac_signature(b"other-secret", payload, &signature));
    assert!(!verify_hmac_signature(secret, payload, "deadbeef"));
    assert!(!verify_hmac_signature(secret, payload, "odd"));
    assert!(!verify_hmac_signature(secret, payload, "not-hex-at-all!!"));
}
