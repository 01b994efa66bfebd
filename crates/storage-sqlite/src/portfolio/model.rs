//! Database models for portfolios, versions and positions.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use riskops_core::portfolio::{
    NewPortfolio, Portfolio, PortfolioState, PortfolioVersion, Position, PositionSizing,
};

use crate::errors::StorageError;
use crate::utils::{decimal_from_text, decimal_to_text, optional_decimal_from_text};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioDB {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: Option<String>,
    pub base_version_id: Option<String>,
    pub is_active: bool,
    pub deleted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PortfolioDB {
    pub fn new(domain: NewPortfolio, id: String, base_version_id: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            name: domain.name,
            description: domain.description,
            user_id: domain.user_id,
            base_version_id: Some(base_version_id),
            is_active: true,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<PortfolioDB> for Portfolio {
    fn from(db: PortfolioDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            user_id: db.user_id,
            base_version_id: db.base_version_id,
            is_active: db.is_active,
            state: PortfolioState::from_deleted_at(db.deleted_at),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Attribute changes. `None` fields are left untouched.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::portfolios)]
pub struct PortfolioChangesetDB {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolio_versions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioVersionDB {
    pub id: String,
    pub portfolio_id: String,
    pub version_number: i32,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub created_by: Option<String>,
}

impl From<PortfolioVersionDB> for PortfolioVersion {
    fn from(db: PortfolioVersionDB) -> Self {
        Self {
            id: db.id,
            portfolio_id: db.portfolio_id,
            version_number: db.version_number,
            description: db.description,
            created_at: db.created_at,
            created_by: db.created_by,
        }
    }
}

impl From<&PortfolioVersion> for PortfolioVersionDB {
    fn from(domain: &PortfolioVersion) -> Self {
        Self {
            id: domain.id.clone(),
            portfolio_id: domain.portfolio_id.clone(),
            version_number: domain.version_number,
            description: domain.description.clone(),
            created_at: domain.created_at,
            created_by: domain.created_by.clone(),
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionDB {
    pub id: String,
    pub portfolio_version_id: String,
    pub asset_id: String,
    pub sort_order: i32,
    pub quantity: Option<String>,
    pub weight: Option<String>,
    pub average_price: Option<String>,
    pub market_value: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl PositionDB {
    pub fn from_domain(position: &Position, sort_order: i32) -> Self {
        Self {
            id: if position.id.is_empty() {
                Uuid::new_v4().to_string()
            } else {
                position.id.clone()
            },
            portfolio_version_id: position.portfolio_version_id.clone(),
            asset_id: position.asset_id.clone(),
            sort_order,
            quantity: position.sizing.quantity().map(decimal_to_text),
            weight: position.sizing.weight().map(decimal_to_text),
            average_price: position.sizing.average_price().map(decimal_to_text),
            market_value: position.market_value.map(decimal_to_text),
            created_at: position.created_at,
            updated_at: position.updated_at,
        }
    }
}

impl TryFrom<PositionDB> for Position {
    type Error = StorageError;

    fn try_from(db: PositionDB) -> Result<Self, Self::Error> {
        let sizing = match (db.quantity.as_deref(), db.weight.as_deref()) {
            (Some(quantity), None) => PositionSizing::Quantity {
                quantity: decimal_from_text("positions.quantity", quantity)?,
                average_price: optional_decimal_from_text(
                    "positions.average_price",
                    db.average_price.as_deref(),
                )?,
            },
            (None, Some(weight)) => PositionSizing::Weight {
                weight: decimal_from_text("positions.weight", weight)?,
            },
            _ => {
                return Err(StorageError::decode(
                    "positions.quantity",
                    format!("position {} must have exactly one of quantity or weight", db.id),
                ))
            }
        };
        Ok(Self {
            id: db.id,
            portfolio_version_id: db.portfolio_version_id,
            asset_id: db.asset_id,
            sizing,
            market_value: optional_decimal_from_text("positions.market_value", db.market_value.as_deref())?,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}
