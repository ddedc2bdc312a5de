use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
    /// Whether the session cookie carries the `Secure` attribute. Built once
    /// at startup and handed to the token service, never read from ambient
    /// process state afterwards.
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// HTTP mail-relay endpoint. When unset, outgoing mail is logged only.
    pub relay_url: Option<String>,
    pub from_address: String,
    /// Base URL used when building activation and reset links.
    pub public_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v != "false")
                .unwrap_or(true),
        };
        let mail = MailConfig {
            relay_url: std::env::var("MAIL_RELAY_URL").ok(),
            from_address: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@kinship.local".into()),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            mail,
        })
    }
}
