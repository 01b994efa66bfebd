
/// Upper bound (inclusive) of a position weight, in percent
pub const MAX_POSITION_WEIGHT: u32 = 100;

/// Allocation bucket for assets without a sector
pub const UNKNOWN_SECTOR: &str = "unknown";

/// Allocation bucket for the part of a basis value not covered by weights
pub const UNALLOCATED_BUCKET: &str = "unallocated";

/// Maximum ticker length accepted in position requests
pub const MAX_TICKER_LEN: usize = 20;

/// Maximum exchange code length accepted in position requests
pub const MAX_EXCHANGE_LEN: usize = 10;

/// Maximum portfolio name length
pub const MAX_PORTFOLIO_NAME_LEN: usize = 255;
