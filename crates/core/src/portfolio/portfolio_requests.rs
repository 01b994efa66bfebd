//! Request and response contracts for portfolio operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allocation::AllocationMap;
use super::portfolio_model::Portfolio;

/// Request to create a portfolio with its first version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioRequest {
    pub name: String,
    pub description: Option<String>,
    pub positions: Vec<CreatePositionRequest>,
}

/// Request to update a portfolio. Supplying positions creates a new version.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortfolioRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub positions: Option<Vec<CreatePositionRequest>>,
}

/// Raw position as submitted by a client. Validated into a [`super::ValidatedPosition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePositionRequest {
    pub ticker: String,
    pub exchange: Option<String>,
    pub asset_type: String,
    pub quantity: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub average_price: Option<Decimal>,
}

impl CreatePositionRequest {
    pub fn with_quantity(ticker: &str, asset_type: &str, quantity: Decimal) -> Self {
        Self {
            ticker: ticker.to_string(),
            exchange: None,
            asset_type: asset_type.to_string(),
            quantity: Some(quantity),
            weight: None,
            average_price: None,
        }
    }

    pub fn with_weight(ticker: &str, asset_type: &str, weight: Decimal) -> Self {
        Self {
            ticker: ticker.to_string(),
            exchange: None,
            asset_type: asset_type.to_string(),
            quantity: None,
            weight: Some(weight),
            average_price: None,
        }
    }
}

/// Request to create a new version of an existing portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioVersionRequest {
    pub description: Option<String>,
    pub positions: Vec<CreatePositionRequest>,
}

/// Portfolio with aggregated valuation data for one version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    #[serde(flatten)]
    pub portfolio: Portfolio,
    pub version_id: String,
    pub version_number: i32,
    pub total_value: Decimal,
    pub total_positions: usize,
    pub asset_allocation: AllocationMap,
    pub sector_allocation: AllocationMap,
    pub currency_allocation: AllocationMap,
}
