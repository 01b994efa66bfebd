use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Immutable historical valuation record for a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub id: String,
    pub portfolio_id: String,
    pub portfolio_version_id: String,
    pub total_value: Decimal,
    pub currency: String,
    pub snapshot_date: NaiveDate,
    pub metadata: Map<String, Value>,
    pub created_at: NaiveDateTime,
}

/// Request to value a version and record the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnapshotRequest {
    pub version_id: String,
    pub snapshot_date: NaiveDate,
    /// Defaults to the currency with the largest allocation.
    pub currency: Option<String>,
    /// Basis value for weight-only versions.
    pub basis: Option<Decimal>,
    pub metadata: Option<Map<String, Value>>,
}
