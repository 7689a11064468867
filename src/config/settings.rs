//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_MAX_IMAGE_BYTES,
    DEFAULT_OTP_TTL_MINUTES, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_STORAGE_ROOT, DEFAULT_STORAGE_URL, MIN_JWT_SECRET_LENGTH,
};

/// How generated OTP messages leave the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsDelivery {
    /// Push an SMS job into the apalis queue
    Queue,
    /// Write the message to the log (development)
    Log,
}

impl From<&str> for SmsDelivery {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "log" => SmsDelivery::Log,
            _ => SmsDelivery::Queue,
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub otp_ttl_minutes: i64,
    pub storage_root: String,
    pub storage_url: String,
    pub max_image_bytes: usize,
    pub sms_delivery: SmsDelivery,
    /// Take client addresses from `X-Forwarded-For` / `X-Real-IP`.
    /// Only safe behind a reverse proxy that overwrites those headers.
    pub trust_proxy: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("otp_ttl_minutes", &self.otp_ttl_minutes)
            .field("storage_root", &self.storage_root)
            .field("storage_url", &self.storage_url)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("sms_delivery", &self.sms_delivery)
            .field("trust_proxy", &self.trust_proxy)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS")
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            otp_ttl_minutes: parse_var("OTP_TTL_MINUTES").unwrap_or(DEFAULT_OTP_TTL_MINUTES),
            storage_root: env::var("STORAGE_ROOT")
                .unwrap_or_else(|_| DEFAULT_STORAGE_ROOT.to_string()),
            storage_url: env::var("STORAGE_URL")
                .unwrap_or_else(|_| DEFAULT_STORAGE_URL.to_string()),
            max_image_bytes: parse_var("MAX_IMAGE_BYTES").unwrap_or(DEFAULT_MAX_IMAGE_BYTES),
            sms_delivery: env::var("SMS_DELIVERY")
                .map(|v| SmsDelivery::from(v.as_str()))
                .unwrap_or(SmsDelivery::Queue),
            trust_proxy: env::var("TRUST_PROXY")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    /// Build a configuration with an explicit secret and development defaults.
    ///
    /// Used by tests and tooling that must not depend on the process environment.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            otp_ttl_minutes: DEFAULT_OTP_TTL_MINUTES,
            storage_root: DEFAULT_STORAGE_ROOT.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            sms_delivery: SmsDelivery::Log,
            trust_proxy: false,
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sms_delivery_from_str() {
        assert_eq!(SmsDelivery::from("log"), SmsDelivery::Log);
        assert_eq!(SmsDelivery::from("LOG"), SmsDelivery::Log);
        assert_eq!(SmsDelivery::from("queue"), SmsDelivery::Queue);
        assert_eq!(SmsDelivery::from("anything"), SmsDelivery::Queue);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::with_secret("a-very-secret-value-that-is-long-enough");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("a-very-secret-value"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("YES"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
        assert!(!Config::with_secret("x".repeat(32)).trust_proxy);
    }

    #[test]
    fn test_server_addr() {
        let config = Config::with_secret("x".repeat(32));
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
    }
}
