use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

const DEFAULT_CORS_ORIGIN: &str = "https://webfrilance.vercel.app";

/// Longest accepted token lifetime (one year).
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub pool_size: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return url
                .parse::<PgConnectOptions>()
                .context("parse DATABASE_URL");
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors_origin: String,
    /// Production mode marks the session cookie `Secure`.
    pub production: bool,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = var("DATABASE_URL");
        // The individual parts are only mandatory without a full URL.
        let part = |key: &str| -> anyhow::Result<String> {
            match var(key) {
                Some(v) => Ok(v),
                None if url.is_some() => Ok(String::new()),
                None => Err(anyhow!("{key} must be set when DATABASE_URL is absent")),
            }
        };

        let database = DatabaseConfig {
            host: var("DB_HOST").unwrap_or_else(|| "localhost".into()),
            port: parse_or(&var, "DB_PORT", 5432)?,
            user: part("DB_USER")?,
            password: part("DB_PASSWORD")?,
            name: part("DB_NAME")?,
            pool_size: parse_or(&var, "DB_POOL_SIZE", 10)?,
            url,
        };

        let jwt = JwtConfig {
            secret: var("JWT_SECRET").context("JWT_SECRET must be set")?,
            ttl: match var("JWT_EXPIRATION") {
                Some(raw) => parse_ttl(&raw)
                    .with_context(|| format!("invalid JWT_EXPIRATION {raw:?}"))?,
                None => Duration::from_secs(7 * 24 * 60 * 60),
            },
        };

        let production = var("APP_ENV")
            .or_else(|| var("NODE_ENV"))
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        Ok(Self {
            database,
            jwt,
            cors_origin: var("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into()),
            production,
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&var, "APP_PORT", 3000)?,
        })
    }
}

fn parse_or<F, T>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid {key} {v:?}")),
        None => Ok(default),
    }
}

/// Parses a token lifetime: bare seconds (`3600`) or a number with one of the
/// suffixes `s`, `m`, `h`, `d`, `w` (`15m`, `7d`). Anything above
/// [`MAX_TTL`] is rejected.
pub fn parse_ttl(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    if digits.is_empty() {
        bail!("missing amount");
    }
    let amount: u64 = digits.parse()?;
    let secs_per_unit = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        other => bail!("unknown unit {other:?}"),
    };
    if amount == 0 {
        bail!("lifetime must be positive");
    }
    let ttl = amount
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| anyhow!("lifetime overflows"))?;
    if ttl > MAX_TTL {
        bail!("lifetime exceeds {} seconds", MAX_TTL.as_secs());
    }
    Ok(ttl)
}
