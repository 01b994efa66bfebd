//! Portfolio, version and position domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assets::Asset;
use crate::errors::{Error, Result};

/// Lifecycle of a portfolio. Deletion is soft and records when it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PortfolioState {
    Active,
    Deleted { at: NaiveDateTime },
}

impl PortfolioState {
    pub fn from_deleted_at(deleted_at: Option<NaiveDateTime>) -> Self {
        match deleted_at {
            Some(at) => PortfolioState::Deleted { at },
            None => PortfolioState::Active,
        }
    }

    pub fn deleted_at(&self) -> Option<NaiveDateTime> {
        match self {
            PortfolioState::Active => None,
            PortfolioState::Deleted { at } => Some(*at),
        }
    }
}

/// A portfolio handle, without its versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: Option<String>,
    pub base_version_id: Option<String>,
    pub is_active: bool,
    pub state: PortfolioState,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Portfolio {
    /// Returns the portfolio if it has not been deleted. Deleted portfolios are
    /// reported as not found.
    pub fn ensure_active(self) -> Result<Self> {
        match self.state {
            PortfolioState::Active => Ok(self),
            PortfolioState::Deleted { .. } => Err(Error::not_found("Portfolio", self.id)),
        }
    }
}

/// Input model for creating a portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub user_id: Option<String>,
}

/// Input model for updating portfolio attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioUpdate {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Immutable, numbered snapshot of a portfolio's position list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioVersion {
    pub id: String,
    pub portfolio_id: String,
    pub version_number: i32,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
}

/// How a position is sized. Exactly one style per position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PositionSizing {
    #[serde(rename_all = "camelCase")]
    Quantity {
        quantity: Decimal,
        average_price: Option<Decimal>,
    },
    /// Percent of total portfolio value, in (0, 100].
    Weight { weight: Decimal },
}

impl PositionSizing {
    pub fn quantity(&self) -> Option<Decimal> {
        match self {
            PositionSizing::Quantity { quantity, .. } => Some(*quantity),
            PositionSizing::Weight { .. } => None,
        }
    }

    pub fn weight(&self) -> Option<Decimal> {
        match self {
            PositionSizing::Quantity { .. } => None,
            PositionSizing::Weight { weight } => Some(*weight),
        }
    }

    pub fn average_price(&self) -> Option<Decimal> {
        match self {
            PositionSizing::Quantity { average_price, .. } => *average_price,
            PositionSizing::Weight { .. } => None,
        }
    }
}

/// One line item within a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub portfolio_version_id: String,
    pub asset_id: String,
    pub sizing: PositionSizing,
    pub market_value: Option<Decimal>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A version together with all of its positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionWithPositions {
    pub version: PortfolioVersion,
    pub positions: Vec<Position>,
}

/// A position with its asset loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPosition {
    pub position: Position,
    pub asset: Asset,
}

/// A portfolio with every version and position loaded, versions in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDetail {
    pub portfolio: Portfolio,
    pub versions: Vec<VersionWithPositions>,
}

impl PortfolioDetail {
    pub fn latest_version(&self) -> Option<&VersionWithPositions> {
        self.versions
            .iter()
            .max_by_key(|v| v.version.version_number)
    }

    pub fn base_version(&self) -> Option<&VersionWithPositions> {
        let base_id = self.portfolio.base_version_id.as_deref()?;
        self.versions.iter().find(|v| v.version.id == base_id)
    }
}
