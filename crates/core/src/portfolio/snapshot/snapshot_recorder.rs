use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::PortfolioSnapshot;
use crate::errors::{Result, ValidationError};
use crate::portfolio::PortfolioVersion;

/// Builds an immutable snapshot record for `version`.
///
/// The currency is upper-cased. Uniqueness per version and date is left to the caller.
pub fn record_snapshot(
    version: &PortfolioVersion,
    total_value: Decimal,
    currency: &str,
    snapshot_date: NaiveDate,
    metadata: Option<Map<String, Value>>,
) -> Result<PortfolioSnapshot> {
    if total_value < Decimal::ZERO {
        return Err(ValidationError::InvalidInput(format!(
            "Snapshot total value must not be negative, got {}",
            total_value
        ))
        .into());
    }
    let currency = currency.trim().to_uppercase();
    if currency.is_empty() {
        return Err(ValidationError::InvalidInput(
            "Snapshot currency cannot be empty".to_string(),
        )
        .into());
    }

    Ok(PortfolioSnapshot {
        id: Uuid::new_v4().to_string(),
        portfolio_id: version.portfolio_id.clone(),
        portfolio_version_id: version.id.clone(),
        total_value,
        currency,
        snapshot_date,
        metadata: metadata.unwrap_or_default(),
        created_at: Utc::now().naive_utc(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use rust_decimal_macros::dec;

    fn version() -> PortfolioVersion {
        PortfolioVersion {
            id: "v1".to_string(),
            portfolio_id: "p1".to_string(),
            version_number: 1,
            description: None,
            created_at: Utc::now().naive_utc(),
            created_by: None,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
    }

    #[test]
    fn records_version_and_portfolio() {
        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::from("manual"));

        let snapshot = record_snapshot(&version(), dec!(1500.25), " usd ", date(), Some(metadata))
            .unwrap();

        assert_eq!(snapshot.portfolio_id, "p1");
        assert_eq!(snapshot.portfolio_version_id, "v1");
        assert_eq!(snapshot.currency, "USD");
        assert_eq!(snapshot.total_value, dec!(1500.25));
        assert_eq!(snapshot.metadata["source"], "manual");
    }

    #[test]
    fn zero_total_is_allowed() {
        let snapshot = record_snapshot(&version(), Decimal::ZERO, "EUR", date(), None).unwrap();
        assert!(snapshot.metadata.is_empty());
    }

    #[test]
    fn rejects_negative_total_and_blank_currency() {
        let err = record_snapshot(&version(), dec!(-1), "USD", date(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = record_snapshot(&version(), dec!(1), "  ", date(), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn each_record_gets_a_fresh_id() {
        let a = record_snapshot(&version(), dec!(1), "USD", date(), None).unwrap();
        let b = record_snapshot(&version(), dec!(1), "USD", date(), None).unwrap();
        assert_ne!(a.id, b.id);
    }
}
