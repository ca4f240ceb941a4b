use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub frontend_url: String,
    pub flutterwave: FlutterwaveConfig,
    pub crypto: CryptoConfig,
}

#[derive(Debug, Clone)]
pub struct FlutterwaveConfig {
    pub secret_key: String,
    pub secret_hash: String,
    pub base_url: String,
    pub mock: bool,
}

#[derive(Debug, Clone)]
pub struct CryptoConfig {
    pub api_key: String,
    pub base_url: String,
    pub mock: bool,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        let host = env_or("APP_HOST", "127.0.0.1");
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let frontend_url = env_or("FRONTEND_URL", "http://localhost:3000");

        let flutterwave = FlutterwaveConfig {
            secret_key: env_or("FLUTTERWAVE_SECRET_KEY", "FLWSECK_TEST-mock-key"),
            secret_hash: env_or("FLUTTERWAVE_SECRET_HASH", ""),
            base_url: env_or("FLUTTERWAVE_BASE_URL", "https://api.flutterwave.com/v3"),
            mock: env_flag("FLUTTERWAVE_MOCK", true),
        };

        let crypto = CryptoConfig {
            api_key: env_or("CRYPTO_API_KEY", "mock-crypto-key"),
            base_url: env_or("CRYPTO_BASE_URL", "https://api.coinbase.com/v2"),
            mock: env_flag("CRYPTO_PAYMENT_MOCK", true),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            frontend_url,
            flutterwave,
            crypto,
        })
    }
}
