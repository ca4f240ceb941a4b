use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
};

use crate::{
    dto::payments::{
        PaymentRequest, PaymentResponse, SupportedCryptocurrencies, VerificationResult,
        VerifyQuery,
    },
    error::{AppError, AppResult},
    models::{PaymentMethod, PaymentStatus},
    response::{ApiResponse, Meta},
    services::payment::{apply_verification, record_payment},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/initialize", post(initialize_payment))
        .route("/verify/{transaction_id}", get(verify_payment))
        .route("/webhook/flutterwave", post(flutterwave_webhook))
        .route("/crypto/supported", get(supported_cryptocurrencies))
}

#[utoipa::path(
    post,
    path = "/api/payments/initialize",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Gateway response; failures surface as a failed status", body = ApiResponse<PaymentResponse>),
        (status = 400, description = "Crypto payment details missing"),
    ),
    tag = "Payments"
)]
pub async fn initialize_payment(
    State(state): State<AppState>,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentResponse>>> {
    if !payload.customer.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    let (response, provider) = if payload.payment_method == PaymentMethod::Crypto {
        if payload.crypto_payment.is_none() {
            return Err(AppError::BadRequest(
                "Crypto payment details required".to_string(),
            ));
        }
        (state.crypto.initialize(&payload).await, "crypto_gateway")
    } else {
        (state.flutterwave.initialize(&payload).await, "flutterwave")
    };

    record_payment(&state.pool, &payload, &response, provider).await?;

    Ok(Json(ApiResponse::success(
        "Payment initialized",
        response,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/payments/verify/{transaction_id}",
    params(
        ("transaction_id" = String, Path, description = "Provider transaction ID"),
        ("payment_method" = Option<String>, Query, description = "flutterwave (default) or crypto"),
    ),
    responses(
        (status = 200, description = "Verification result", body = ApiResponse<VerificationResult>)
    ),
    tag = "Payments"
)]
pub async fn verify_payment(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    Query(query): Query<VerifyQuery>,
) -> AppResult<Json<ApiResponse<VerificationResult>>> {
    let result = if query.payment_method.as_deref() == Some("crypto") {
        state.crypto.verify(&transaction_id).await
    } else {
        state.flutterwave.verify(&transaction_id).await
    };

    apply_verification(&state.pool, &transaction_id, result.status).await?;

    Ok(Json(ApiResponse::success(
        "Verification",
        result,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    post,
    path = "/api/payments/webhook/flutterwave",
    request_body(content = String, description = "Raw webhook payload, signed via the verif-hash header"),
    responses(
        (status = 200, description = "Webhook accepted", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Signature verification failed"),
    ),
    tag = "Payments"
)]
pub async fn flutterwave_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let signature = headers
        .get("verif-hash")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !state.flutterwave.verify_webhook(&body, signature) {
        return Err(AppError::Unauthorized);
    }

    let event: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|err| AppError::BadRequest(format!("Invalid webhook payload: {err}")))?;

    // Provider ids arrive as numbers or strings depending on the event kind.
    let transaction_id = event["data"]["id"].to_string().trim_matches('"').to_string();
    let status = match event["data"]["status"].as_str() {
        Some("successful") => PaymentStatus::Successful,
        Some("failed") => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    };
    apply_verification(&state.pool, &transaction_id, status).await?;

    tracing::info!(%transaction_id, status = status.as_str(), "webhook applied");
    Ok(Json(ApiResponse::success(
        "Webhook processed",
        serde_json::json!({ "status": "ok" }),
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/payments/crypto/supported",
    responses(
        (status = 200, description = "Supported crypto assets with rates", body = ApiResponse<SupportedCryptocurrencies>)
    ),
    tag = "Payments"
)]
pub async fn supported_cryptocurrencies(
    State(state): State<AppState>,
) -> Json<ApiResponse<SupportedCryptocurrencies>> {
    Json(ApiResponse::success(
        "Supported cryptocurrencies",
        state.crypto.supported(),
        Some(Meta::empty()),
    ))
}
