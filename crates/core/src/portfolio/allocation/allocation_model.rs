//! Allocation models for portfolio breakdowns.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::UNALLOCATED_BUCKET;

/// Bucket key to percent of total value (0-100).
pub type AllocationMap = BTreeMap<String, Decimal>;

/// Allocation breakdowns of one valuation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioAllocations {
    /// Keyed by asset type (`stock`, `crypto`, ...)
    pub asset_types: AllocationMap,
    /// Keyed by sector, `unknown` when the asset has none
    pub sectors: AllocationMap,
    /// Keyed by the asset's native currency code
    pub currencies: AllocationMap,
}

impl PortfolioAllocations {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.asset_types.is_empty() && self.sectors.is_empty() && self.currencies.is_empty()
    }

    /// The currency holding the largest share. Ties resolve to the
    /// alphabetically first code. The unallocated residual never wins.
    pub fn dominant_currency(&self) -> Option<&str> {
        let mut best: Option<(&String, &Decimal)> = None;
        for (code, percent) in &self.currencies {
            if code == UNALLOCATED_BUCKET {
                continue;
            }
            match best {
                Some((_, top)) if percent <= top => {}
                _ => best = Some((code, percent)),
            }
        }
        best.map(|(code, _)| code.as_str())
    }
}
