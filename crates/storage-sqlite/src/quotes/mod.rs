//! SQLite storage implementation for market quotes.

mod model;
mod repository;

pub use model::QuoteDB;
pub use repository::QuoteRepository;
