use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::payments::{PaymentRequest, PaymentResponse, VerificationResult},
    error::AppResult,
    models::{Payment, PaymentStatus},
};

pub mod crypto;
pub mod flutterwave;

/// Capability interface shared by both gateway families. Mock and live
/// implementations are interchangeable and selected once at construction.
pub trait PaymentGateway {
    fn initialize(
        &self,
        request: &PaymentRequest,
    ) -> impl Future<Output = PaymentResponse> + Send;

    fn verify(&self, transaction_id: &str) -> impl Future<Output = VerificationResult> + Send;

    /// HMAC-SHA256 signature check over the raw webhook payload.
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> bool;
}

/// Persist a transaction record for an initialized payment. Status changes
/// afterwards only through explicit verify calls.
pub async fn record_payment(
    pool: &DbPool,
    request: &PaymentRequest,
    response: &PaymentResponse,
    provider: &str,
) -> AppResult<Payment> {
    let id = Uuid::new_v4();
    let tx_ref = format!("tx_{}", &id.to_string()[..8]);
    let method = serde_json::to_value(request.payment_method)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "card".to_string());

    let payment = sqlx::query_as::<_, Payment>(
        "INSERT INTO payments
             (id, tx_ref, amount, currency, customer, payment_method, provider,
              status, description, metadata, crypto, provider_tx_id, provider_response)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         RETURNING *",
    )
    .bind(id)
    .bind(tx_ref)
    .bind(request.amount)
    .bind(&request.currency)
    .bind(Json(&request.customer))
    .bind(method)
    .bind(provider)
    .bind(response.status.as_str())
    .bind(&request.description)
    .bind(Json(&request.metadata))
    .bind(request.crypto_payment.as_ref().map(Json))
    .bind((!response.id.is_empty()).then(|| response.id.clone()))
    .bind(Json(&response.provider_response))
    .fetch_one(pool)
    .await?;

    tracing::info!(payment_id = %payment.id, provider, "payment recorded");
    Ok(payment)
}

/// Best-effort status transition after a verify call. Unknown transaction ids
/// are ignored; the provider remains the source of truth for those.
pub async fn apply_verification(
    pool: &DbPool,
    transaction_id: &str,
    status: PaymentStatus,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE payments
         SET status = $2,
             updated_at = now(),
             completed_at = CASE WHEN $2 = 'successful' THEN now() ELSE completed_at END
         WHERE provider_tx_id = $1",
    )
    .bind(transaction_id)
    .bind(status.as_str())
    .execute(pool)
    .await?;
    Ok(())
}
