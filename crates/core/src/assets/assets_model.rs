//! Asset domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_EXCHANGE_LEN, MAX_TICKER_LEN, UNALLOCATED_BUCKET, UNKNOWN_SECTOR};
use crate::errors::{Result, ValidationError};
use crate::Error;

/// Type of a tradable instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Stock,
    Crypto,
    Bond,
    Etf,
    Option,
    Future,
    Forex,
}

impl AssetType {
    pub const ALL: [AssetType; 7] = [
        AssetType::Stock,
        AssetType::Crypto,
        AssetType::Bond,
        AssetType::Etf,
        AssetType::Option,
        AssetType::Future,
        AssetType::Forex,
    ];

    /// Returns the database / wire string representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Crypto => "crypto",
            AssetType::Bond => "bond",
            AssetType::Etf => "etf",
            AssetType::Option => "option",
            AssetType::Future => "future",
            AssetType::Forex => "forex",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        AssetType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Unsupported asset type '{}'",
                    s
                )))
            })
    }
}

/// Domain model representing a tradable instrument.
///
/// `ticker` + `exchange` + `asset_type` identify the instrument; `id` is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub ticker: String,
    pub exchange: Option<String>,
    pub asset_type: AssetType,
    pub name: String,
    pub currency: String,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub isin: Option<String>,
    pub cusip: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Asset {
    pub fn key(&self) -> AssetKey {
        AssetKey::new(&self.ticker, self.exchange.as_deref(), self.asset_type)
    }

    /// Sector used for allocation grouping.
    pub fn sector_bucket(&self) -> &str {
        self.sector
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SECTOR)
    }
}

/// Normalized lookup key for an instrument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    pub ticker: String,
    pub exchange: Option<String>,
    pub asset_type: AssetType,
}

impl AssetKey {
    /// Builds a key with upper-cased ticker and exchange. An empty exchange is
    /// treated as absent.
    pub fn new(ticker: &str, exchange: Option<&str>, asset_type: AssetType) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            exchange: exchange
                .map(|e| e.trim().to_uppercase())
                .filter(|e| !e.is_empty()),
            asset_type,
        }
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exchange {
            Some(exchange) => write!(f, "{}:{}:{}", self.asset_type, exchange, self.ticker),
            None => write!(f, "{}:{}", self.asset_type, self.ticker),
        }
    }
}

/// Input model for registering an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub id: Option<String>,
    pub ticker: String,
    pub exchange: Option<String>,
    pub asset_type: AssetType,
    pub name: Option<String>,
    pub currency: String,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub isin: Option<String>,
    pub cusip: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

impl NewAsset {
    /// Minimal asset for a ticker that is not yet in the registry.
    pub fn minimal(key: &AssetKey, currency: &str) -> Self {
        Self {
            id: None,
            ticker: key.ticker.clone(),
            exchange: key.exchange.clone(),
            asset_type: key.asset_type,
            name: None,
            currency: currency.to_string(),
            sector: None,
            country: None,
            isin: None,
            cusip: None,
            is_active: true,
        }
    }

    /// Validates the new asset data
    pub fn validate(&self) -> Result<()> {
        let ticker = self.ticker.trim();
        if ticker.is_empty() || ticker.len() > MAX_TICKER_LEN {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Ticker must be between 1 and {} characters",
                MAX_TICKER_LEN
            ))));
        }
        if self
            .exchange
            .as_deref()
            .is_some_and(|e| e.trim().len() > MAX_EXCHANGE_LEN)
        {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Exchange must be at most {} characters",
                MAX_EXCHANGE_LEN
            ))));
        }
        if self.currency.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Currency cannot be empty".to_string(),
            )));
        }
        // The bucket name is reserved for the residual of a basis value
        if self
            .sector
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(UNALLOCATED_BUCKET))
        {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Sector '{}' is reserved",
                UNALLOCATED_BUCKET
            ))));
        }
        Ok(())
    }

    /// Returns a copy with normalized identity fields. The name defaults to the ticker.
    pub fn normalized(self) -> Self {
        let key = AssetKey::new(&self.ticker, self.exchange.as_deref(), self.asset_type);
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| key.ticker.clone());
        Self {
            ticker: key.ticker,
            exchange: key.exchange,
            name: Some(name),
            currency: self.currency.trim().to_uppercase(),
            ..self
        }
    }
}
