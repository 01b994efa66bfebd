//! Validation of raw position requests into typed positions.

use std::str::FromStr;
use std::sync::Arc;

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assets::{Asset, AssetRegistryTrait, AssetType};
use crate::constants::{MAX_EXCHANGE_LEN, MAX_PORTFOLIO_NAME_LEN, MAX_POSITION_WEIGHT, MAX_TICKER_LEN};
use crate::errors::{Error, ErrorKind, Result, ValidationError};
use crate::portfolio::{CreatePositionRequest, PositionSizing};

/// A position request that passed validation, with its asset resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedPosition {
    pub asset: Asset,
    pub sizing: PositionSizing,
}

/// Validates position requests against the sizing rules and the asset registry.
pub struct PositionValidator {
    asset_registry: Arc<dyn AssetRegistryTrait>,
}

impl PositionValidator {
    pub fn new(asset_registry: Arc<dyn AssetRegistryTrait>) -> Self {
        Self { asset_registry }
    }

    /// Validates every request and resolves its asset, keeping input order.
    ///
    /// Shape checks run for all requests before the registry is consulted, so a
    /// malformed request fails without any lookup.
    pub async fn validate_positions(
        &self,
        requests: &[CreatePositionRequest],
    ) -> Result<Vec<ValidatedPosition>> {
        if requests.is_empty() {
            return Err(ValidationError::EmptyPositions.into());
        }

        let shaped = requests
            .iter()
            .enumerate()
            .map(|(index, request)| check_shape(index, request))
            .collect::<Result<Vec<_>>>()?;

        let mut validated = Vec::with_capacity(shaped.len());
        for (request, (asset_type, sizing)) in requests.iter().zip(shaped) {
            let asset = self
                .asset_registry
                .resolve_asset(&request.ticker, request.exchange.as_deref(), asset_type)
                .await
                .map_err(|e| match e.kind() {
                    ErrorKind::NotFound => Error::UnknownAsset {
                        ticker: request.ticker.trim().to_uppercase(),
                        exchange: request.exchange.clone(),
                        asset_type: asset_type.to_string(),
                    },
                    _ => e,
                })?;
            debug!("Resolved {} to asset {}", request.ticker, asset.id);
            validated.push(ValidatedPosition { asset, sizing });
        }

        Ok(validated)
    }
}

/// Checks a single request's syntax and sizing rules.
pub fn check_shape(
    index: usize,
    request: &CreatePositionRequest,
) -> Result<(AssetType, PositionSizing)> {
    let ticker = request.ticker.trim();
    if ticker.is_empty() || ticker.chars().count() > MAX_TICKER_LEN {
        return Err(ValidationError::InvalidInput(format!(
            "Position {}: ticker must be between 1 and {} characters",
            index, MAX_TICKER_LEN
        ))
        .into());
    }
    if request
        .exchange
        .as_deref()
        .is_some_and(|e| e.trim().chars().count() > MAX_EXCHANGE_LEN)
    {
        return Err(ValidationError::InvalidInput(format!(
            "Position {}: exchange must be at most {} characters",
            index, MAX_EXCHANGE_LEN
        ))
        .into());
    }
    let asset_type = AssetType::from_str(&request.asset_type)?;

    let sizing = match (request.quantity, request.weight) {
        (Some(quantity), None) => {
            if quantity <= Decimal::ZERO {
                return Err(ValidationError::InvalidQuantity {
                    index,
                    ticker: ticker.to_string(),
                    quantity,
                }
                .into());
            }
            check_average_price(index, ticker, request.average_price)?;
            PositionSizing::Quantity {
                quantity,
                average_price: request.average_price,
            }
        }
        (None, Some(weight)) => {
            if weight <= Decimal::ZERO || weight > Decimal::from(MAX_POSITION_WEIGHT) {
                return Err(ValidationError::InvalidWeight {
                    index,
                    ticker: ticker.to_string(),
                    weight,
                }
                .into());
            }
            // Weight sizing carries no price; a valid one is accepted and dropped
            check_average_price(index, ticker, request.average_price)?;
            PositionSizing::Weight { weight }
        }
        _ => {
            return Err(ValidationError::InvalidPositionData {
                index,
                ticker: ticker.to_string(),
            }
            .into())
        }
    };

    Ok((asset_type, sizing))
}

fn check_average_price(index: usize, ticker: &str, average_price: Option<Decimal>) -> Result<()> {
    match average_price {
        Some(price) if price <= Decimal::ZERO => Err(ValidationError::InvalidInput(format!(
            "Position {} ({}): average price must be greater than 0, got {}",
            index, ticker, price
        ))
        .into()),
        _ => Ok(()),
    }
}

/// Validates a portfolio name and returns it trimmed.
pub fn validate_portfolio_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyPortfolioName.into());
    }
    if trimmed.chars().count() > MAX_PORTFOLIO_NAME_LEN {
        return Err(ValidationError::InvalidInput(format!(
            "Portfolio name must be at most {} characters",
            MAX_PORTFOLIO_NAME_LEN
        ))
        .into());
    }
    Ok(trimmed.to_string())
}
