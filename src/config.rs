use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Registering with this email yields an `admin` account.
    pub admin_email: Option<String>,
    pub host: String,
    pub port: u16,
}

const DEFAULT_TTL_MINUTES: i64 = 60 * 24 * 30;
/// Ten years; keeps `iat + ttl` well inside the timestamp range.
const MAX_TTL_SECS: i64 = 60 * 60 * 24 * 365 * 10;

fn parse_ttl_minutes(raw: &str) -> Option<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|m| *m > 0)
        .filter(|m| m.checked_mul(60).is_some_and(|secs| secs <= MAX_TTL_SECS))
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "attendance-hub".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "attendance-hub-users".into()),
            ttl_minutes: match lookup("JWT_TTL_MINUTES") {
                Some(v) => parse_ttl_minutes(&v)
                    .with_context(|| format!("invalid JWT_TTL_MINUTES {v:?}"))?,
                None => DEFAULT_TTL_MINUTES,
            },
        };
        let admin_email = lookup("ADMIN_EMAIL")
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("APP_PORT") {
            Some(p) => p.parse::<u16>().with_context(|| format!("invalid APP_PORT {p:?}"))?,
            None => 5001,
        };

        Ok(Self {
            database_url,
            jwt,
            admin_email,
            host,
            port,
        })
    }
}
