use std::{net::SocketAddr, time::Duration};

use anyhow::{anyhow, bail, Context};
use axum::http::HeaderValue;
use riskops_core::assets::AssetResolutionPolicy;

const DEFAULT_PRICE_MAX_AGE_SECS: i64 = 86_400 * 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub price_max_age: chrono::Duration,
    pub asset_policy: AssetResolutionPolicy,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads `.env` (if any) and reads the `RISKOPS_*` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let listen_addr: SocketAddr = var("RISKOPS_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid RISKOPS_LISTEN_ADDR")?;
        let db_path = var("RISKOPS_DB_PATH", "./db/riskops.db");

        let cors_allow: Vec<String> = var("RISKOPS_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in cors_allow.iter().filter(|o| o.as_str() != "*") {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid origin '{}' in RISKOPS_CORS_ALLOW_ORIGINS", origin))?;
        }

        let timeout_ms: u64 = var("RISKOPS_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .context("Invalid RISKOPS_REQUEST_TIMEOUT_MS")?;
        let max_age_secs: i64 = var(
            "RISKOPS_PRICE_MAX_AGE_SECS",
            &DEFAULT_PRICE_MAX_AGE_SECS.to_string(),
        )
        .parse()
        .context("Invalid RISKOPS_PRICE_MAX_AGE_SECS")?;
        if max_age_secs < 0 {
            bail!("RISKOPS_PRICE_MAX_AGE_SECS must not be negative");
        }

        let asset_policy = parse_asset_policy(&var("RISKOPS_ASSET_POLICY", "strict"))?;
        let log_level = var("RISKOPS_LOG_LEVEL", "info");
        let log_format = match var("RISKOPS_LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => bail!("Invalid RISKOPS_LOG_FORMAT '{}', expected text or json", other),
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            price_max_age: chrono::Duration::seconds(max_age_secs),
            asset_policy,
            log_level,
            log_format,
        })
    }
}

/// `strict` or `create:<CCY>`.
fn parse_asset_policy(value: &str) -> anyhow::Result<AssetResolutionPolicy> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("strict") {
        return Ok(AssetResolutionPolicy::Strict);
    }
    let currency = value
        .strip_prefix("create:")
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| anyhow!("Invalid RISKOPS_ASSET_POLICY '{}', expected strict or create:<CCY>", value))?;
    Ok(AssetResolutionPolicy::CreateMissing {
        currency: currency.to_uppercase(),
    })
}
