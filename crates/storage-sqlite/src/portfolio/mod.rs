//! SQLite storage for portfolios, versions, positions and snapshots.

mod model;
mod repository;
pub mod snapshot;

pub use model::{PortfolioDB, PortfolioVersionDB, PositionDB};
pub use repository::PortfolioRepository;
