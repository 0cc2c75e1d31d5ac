use std::env;
use tracing::warn;

const DEFAULT_SLOT_MINUTES: i64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub bind_addr: String,
    pub mail_gateway_url: String,
    pub mail_from: String,
    pub default_slot_minutes: i64,
    pub require_slot_alignment: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            mail_gateway_url: env::var("MAIL_GATEWAY_URL")
                .unwrap_or_else(|_| {
                    warn!("MAIL_GATEWAY_URL not set, notifications will be logged and dropped");
                    String::new()
                }),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@clinic.local".to_string()),
            default_slot_minutes: env::var("DEFAULT_SLOT_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SLOT_MINUTES),
            require_slot_alignment: env::var("REQUIRE_SLOT_ALIGNMENT")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.jwt_secret.is_empty()
    }

    pub fn is_mail_configured(&self) -> bool {
        !self.mail_gateway_url.is_empty() && !self.mail_from.is_empty()
    }
}
