//! Groups valued positions into percentage breakdowns.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::allocation_model::{AllocationMap, PortfolioAllocations};
use crate::constants::UNALLOCATED_BUCKET;
use crate::errors::{CalculatorError, Result};
use crate::portfolio::valuation::ValuedPosition;

/// Builds the asset type, sector and currency breakdowns.
///
/// `unallocated_value` is the part of `total_value` not covered by any
/// position; when positive it is reported under `"unallocated"` in every
/// breakdown. A zero total yields empty maps.
pub fn calculate_allocations(
    positions: &[ValuedPosition],
    total_value: Decimal,
    unallocated_value: Decimal,
) -> Result<PortfolioAllocations> {
    if total_value.is_zero() {
        return Ok(PortfolioAllocations::empty());
    }

    let asset_types = breakdown(
        positions.iter().map(|p| (p.asset_type.as_str(), p.market_value)),
        total_value,
        unallocated_value,
    )?;
    let sectors = breakdown(
        positions.iter().map(|p| (p.sector.as_str(), p.market_value)),
        total_value,
        unallocated_value,
    )?;
    let currencies = breakdown(
        positions.iter().map(|p| (p.currency.as_str(), p.market_value)),
        total_value,
        unallocated_value,
    )?;

    Ok(PortfolioAllocations {
        asset_types,
        sectors,
        currencies,
    })
}

fn breakdown<'a>(
    values: impl Iterator<Item = (&'a str, Decimal)>,
    total_value: Decimal,
    unallocated_value: Decimal,
) -> Result<AllocationMap> {
    let mut sums: AllocationMap = AllocationMap::new();
    for (key, value) in values {
        let entry = sums.entry(key.to_string()).or_insert(Decimal::ZERO);
        *entry = entry
            .checked_add(value)
            .ok_or(CalculatorError::Overflow("allocation bucket"))?;
    }
    if unallocated_value > Decimal::ZERO {
        let entry = sums
            .entry(UNALLOCATED_BUCKET.to_string())
            .or_insert(Decimal::ZERO);
        *entry = entry
            .checked_add(unallocated_value)
            .ok_or(CalculatorError::Overflow("allocation bucket"))?;
    }

    let mut percents = AllocationMap::new();
    for (key, value) in sums {
        // Only positive buckets are reported
        if value <= Decimal::ZERO {
            continue;
        }
        let percent = value
            .checked_div(total_value)
            .and_then(|share| share.checked_mul(dec!(100)))
            .ok_or(CalculatorError::Overflow("allocation percent"))?;
        percents.insert(key, percent);
    }
    Ok(percents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::PositionSizing;

    fn valued(asset_type: &str, sector: &str, currency: &str, value: Decimal) -> ValuedPosition {
        ValuedPosition {
            position_id: format!("p-{}-{}", asset_type, value),
            asset_id: format!("a-{}", asset_type),
            asset_type: asset_type.to_string(),
            sector: sector.to_string(),
            currency: currency.to_string(),
            sizing: PositionSizing::Quantity {
                quantity: dec!(1),
                average_price: None,
            },
            price: Some(value),
            market_value: value,
        }
    }

    #[test]
    fn groups_by_each_key() {
        let positions = vec![
            valued("stock", "Technology", "USD", dec!(600)),
            valued("stock", "Energy", "EUR", dec!(200)),
            valued("crypto", "unknown", "USD", dec!(200)),
        ];

        let allocations = calculate_allocations(&positions, dec!(1000), Decimal::ZERO).unwrap();

        assert_eq!(allocations.asset_types["stock"], dec!(80));
        assert_eq!(allocations.asset_types["crypto"], dec!(20));
        assert_eq!(allocations.sectors["Technology"], dec!(60));
        assert_eq!(allocations.sectors["unknown"], dec!(20));
        assert_eq!(allocations.currencies["USD"], dec!(80));
        assert_eq!(allocations.currencies["EUR"], dec!(20));
        assert_eq!(allocations.dominant_currency(), Some("USD"));
    }

    #[test]
    fn zero_total_is_empty() {
        let positions = vec![valued("stock", "Technology", "USD", Decimal::ZERO)];
        let allocations = calculate_allocations(&positions, Decimal::ZERO, Decimal::ZERO).unwrap();
        assert!(allocations.is_empty());
        assert_eq!(allocations.dominant_currency(), None);
    }

    #[test]
    fn residual_goes_to_unallocated_bucket() {
        let positions = vec![valued("etf", "unknown", "USD", dec!(600))];

        let allocations = calculate_allocations(&positions, dec!(1000), dec!(400)).unwrap();

        for breakdown in [
            &allocations.asset_types,
            &allocations.sectors,
            &allocations.currencies,
        ] {
            assert_eq!(breakdown[UNALLOCATED_BUCKET], dec!(40));
            assert_eq!(breakdown.values().copied().sum::<Decimal>(), dec!(100));
        }
        assert_eq!(allocations.dominant_currency(), Some("USD"));
    }

    #[test]
    fn zero_value_buckets_are_dropped() {
        let positions = vec![
            valued("stock", "Technology", "USD", dec!(100)),
            valued("bond", "Government", "USD", Decimal::ZERO),
        ];

        let allocations = calculate_allocations(&positions, dec!(100), Decimal::ZERO).unwrap();

        assert!(!allocations.asset_types.contains_key("bond"));
        assert!(!allocations.sectors.contains_key("Government"));
    }

    #[test]
    fn currency_ties_resolve_alphabetically() {
        let positions = vec![
            valued("stock", "unknown", "USD", dec!(50)),
            valued("stock", "unknown", "EUR", dec!(50)),
        ];

        let allocations = calculate_allocations(&positions, dec!(100), Decimal::ZERO).unwrap();
        assert_eq!(allocations.dominant_currency(), Some("EUR"));
    }
}
