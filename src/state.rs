use crate::{
    config::AppConfig,
    db::DbPool,
    services::payment::{crypto::CryptoGateway, flutterwave::FlutterwaveGateway},
};

/// Shared per-process state. Gateways are selected (mock or live) once at
/// construction, never per call.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub flutterwave: FlutterwaveGateway,
    pub crypto: CryptoGateway,
}

impl AppState {
    pub fn new(pool: DbPool, config: &AppConfig) -> Self {
        Self {
            pool,
            flutterwave: FlutterwaveGateway::from_config(
                &config.flutterwave,
                &config.frontend_url,
            ),
            crypto: CryptoGateway::from_config(&config.crypto),
        }
    }
}
