use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::valuation_model::{PriceMap, Valuation, ValuedPosition};
use crate::errors::{CalculatorError, Result};
use crate::portfolio::allocation::calculate_allocations;
use crate::portfolio::{PositionSizing, ResolvedPosition};

/// Computes the total value, per-position market values and allocation
/// breakdowns of a version.
///
/// # Arguments
///
/// * `version_id` - The version being valued, carried into the result.
/// * `positions` - Positions of the version with their assets loaded.
/// * `prices` - One price per asset of every quantity-based position.
/// * `basis` - Total value used when the version only has weight-based positions.
/// * `as_of` - The time the prices were taken at.
///
/// Quantity-based positions contribute `quantity * price`. Weight-based
/// positions take `weight / 100` of the total, which is derived from the
/// quantity subtotal when both styles are present and from `basis` otherwise.
pub fn calculate_valuation(
    version_id: &str,
    positions: &[ResolvedPosition],
    prices: &PriceMap,
    basis: Option<Decimal>,
    as_of: DateTime<Utc>,
) -> Result<Valuation> {
    if let Some(b) = basis {
        if b < Decimal::ZERO {
            return Err(CalculatorError::NegativeBasis(b).into());
        }
    }

    let mut quantity_value = Decimal::ZERO;
    let mut total_weight = Decimal::ZERO;
    let mut has_quantity = false;
    let mut has_weight = false;
    // (price, market value) of quantity-based positions, by position index
    let mut quoted: Vec<Option<(Decimal, Decimal)>> = Vec::with_capacity(positions.len());

    for rp in positions {
        match rp.position.sizing {
            PositionSizing::Quantity { quantity, .. } => {
                has_quantity = true;
                let price = prices
                    .get(&rp.asset.id)
                    .ok_or_else(|| CalculatorError::MissingPrice(rp.asset.id.clone()))?
                    .price;
                if price < Decimal::ZERO {
                    return Err(CalculatorError::NegativePrice {
                        asset_id: rp.asset.id.clone(),
                        price,
                    }
                    .into());
                }
                let value = quantity
                    .checked_mul(price)
                    .ok_or(CalculatorError::Overflow("position market value"))?;
                quantity_value = quantity_value
                    .checked_add(value)
                    .ok_or(CalculatorError::Overflow("quantity subtotal"))?;
                quoted.push(Some((price, value)));
            }
            PositionSizing::Weight { weight } => {
                has_weight = true;
                total_weight = total_weight
                    .checked_add(weight)
                    .ok_or(CalculatorError::Overflow("total weight"))?;
                quoted.push(None);
            }
        }
    }

    let hundred = dec!(100);
    let (total_value, unallocated_value) = match (has_quantity, has_weight) {
        (_, false) => (quantity_value, Decimal::ZERO),
        (true, true) => {
            if total_weight >= hundred {
                return Err(CalculatorError::InconsistentAllocation { total_weight }.into());
            }
            let quantity_share = (hundred - total_weight) / hundred;
            let total = quantity_value
                .checked_div(quantity_share)
                .ok_or(CalculatorError::Overflow("total value"))?;
            if basis.is_some() {
                debug!(
                    "Ignoring basis for version {} which has quantity-based positions",
                    version_id
                );
            }
            (total, Decimal::ZERO)
        }
        (false, true) => {
            let b = basis.ok_or_else(|| CalculatorError::MissingBasisValue {
                version_id: version_id.to_string(),
            })?;
            if total_weight > hundred {
                return Err(CalculatorError::InconsistentAllocation { total_weight }.into());
            }
            let unallocated = b
                .checked_mul((hundred - total_weight) / hundred)
                .ok_or(CalculatorError::Overflow("unallocated value"))?;
            (b, unallocated)
        }
    };

    let mut valued = Vec::with_capacity(positions.len());
    for (rp, quote) in positions.iter().zip(quoted) {
        let (price, market_value) = match quote {
            Some((price, value)) => (Some(price), value),
            None => {
                let weight = rp.position.sizing.weight().unwrap_or_default();
                let value = total_value
                    .checked_mul(weight / hundred)
                    .ok_or(CalculatorError::Overflow("position market value"))?;
                (None, value)
            }
        };
        valued.push(ValuedPosition {
            position_id: rp.position.id.clone(),
            asset_id: rp.asset.id.clone(),
            asset_type: rp.asset.asset_type.to_string(),
            sector: rp.asset.sector_bucket().to_string(),
            currency: rp.asset.currency.clone(),
            sizing: rp.position.sizing,
            price,
            market_value,
        });
    }

    let allocations = calculate_allocations(&valued, total_value, unallocated_value)?;

    Ok(Valuation {
        version_id: version_id.to_string(),
        as_of,
        total_value,
        quantity_value,
        total_weight,
        unallocated_value,
        allocations,
        positions: valued,
    })
}
