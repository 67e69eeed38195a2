use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Yearly allowance every employee is reset to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allowance {
    pub annual_days: i32,
    pub vacation_days: i32,
    pub sick_days: i32,
}

impl Default for Allowance {
    fn default() -> Self {
        Self {
            annual_days: 30,
            vacation_days: 15,
            sick_days: 15,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// How long the HR/admin recipient list is served from memory.
    pub recipient_cache_ttl_secs: u64,
    pub allowance: Allowance,
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let defaults = Allowance::default();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            recipient_cache_ttl_secs: var_or("RECIPIENT_CACHE_TTL_SECS", 60)?,
            allowance: Allowance {
                annual_days: var_or("PTO_ANNUAL_DAYS", defaults.annual_days)?,
                vacation_days: var_or("PTO_VACATION_DAYS", defaults.vacation_days)?,
                sick_days: var_or("PTO_SICK_DAYS", defaults.sick_days)?,
            },
        })
    }
}
