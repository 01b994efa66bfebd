//! Allocation breakdowns by asset type, sector and currency.

mod allocation_calculator;
mod allocation_model;

pub use allocation_calculator::calculate_allocations;
pub use allocation_model::{AllocationMap, PortfolioAllocations};
