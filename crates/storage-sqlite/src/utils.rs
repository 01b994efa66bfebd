//! Helpers shared by the SQLite repositories.
//!
//! Decimals are stored as canonical TEXT so no precision is lost, and large
//! `IN (...)` lists are split to stay under SQLite's parameter limit.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::StorageError;

/// Maximum number of parameters for SQLite IN (...) queries.
///
/// SQLite's default SQLITE_MAX_VARIABLE_NUMBER is 999; 500 leaves room for the
/// other parameters of a query.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Splits a slice into chunks of at most [`SQLITE_MAX_PARAMS_CHUNK`] items.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

pub fn decimal_to_text(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn decimal_from_text(column: &'static str, text: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(text).map_err(|e| StorageError::decode(column, e))
}

pub fn optional_decimal_from_text(
    column: &'static str,
    text: Option<&str>,
) -> Result<Option<Decimal>, StorageError> {
    text.map(|t| decimal_from_text(column, t)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn chunking_respects_the_limit() {
        let items: Vec<i32> = (0..1200).collect();
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), SQLITE_MAX_PARAMS_CHUNK);
        assert_eq!(chunks[2].len(), 200);

        let empty: Vec<i32> = vec![];
        assert_eq!(chunk_for_sqlite(&empty).count(), 0);
    }

    #[test]
    fn decimals_keep_their_precision() {
        let text = decimal_to_text(dec!(0.123456789012345678));
        assert_eq!(text, "0.123456789012345678");
        assert_eq!(
            decimal_from_text("quotes.price", &text).unwrap(),
            dec!(0.123456789012345678)
        );
        assert_eq!(decimal_to_text(dec!(10.500)), "10.5");
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decimal_from_text("positions.quantity", "12,5").unwrap_err();
        assert!(matches!(
            err,
            StorageError::Decode {
                column: "positions.quantity",
                ..
            }
        ));
        assert_eq!(optional_decimal_from_text("positions.weight", None).unwrap(), None);
    }
}
