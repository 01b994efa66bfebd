//! Position and portfolio input validation.

mod position_validator;

pub use position_validator::{
    check_shape, validate_portfolio_name, PositionValidator, ValidatedPosition,
};
