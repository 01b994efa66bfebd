use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::allocation::PortfolioAllocations;
use crate::portfolio::PositionSizing;
use crate::quotes::Price;

/// Prices keyed by asset id, all taken at the same `as_of`.
pub type PriceMap = HashMap<String, Price>;

/// A position with its resolved market value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuedPosition {
    pub position_id: String,
    pub asset_id: String,
    pub asset_type: String,
    /// Sector bucket, `unknown` when the asset has none.
    pub sector: String,
    pub currency: String,
    pub sizing: PositionSizing,
    /// Unit price used, only set for quantity-based positions.
    pub price: Option<Decimal>,
    pub market_value: Decimal,
}

/// Total value and breakdowns of one version at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub version_id: String,
    pub as_of: DateTime<Utc>,
    pub total_value: Decimal,
    /// Sum of quantity x price over quantity-based positions.
    pub quantity_value: Decimal,
    /// Sum of weights over weight-based positions, in percent.
    pub total_weight: Decimal,
    /// Part of a basis value not covered by weight-based positions.
    pub unallocated_value: Decimal,
    pub allocations: PortfolioAllocations,
    pub positions: Vec<ValuedPosition>,
}
