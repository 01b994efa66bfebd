//! Derivation of new portfolio versions from validated positions.

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::errors::{Result, ValidationError};
use crate::portfolio::validation::ValidatedPosition;
use crate::portfolio::{PortfolioVersion, Position, VersionWithPositions};

/// A version that has passed validation but has not been numbered yet.
///
/// Storage numbers it with [`VersionDraft::into_version`] inside the same
/// transaction that inserts it, so concurrent drafts for one portfolio never
/// share a number.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionDraft {
    pub id: String,
    pub portfolio_id: String,
    pub description: Option<String>,
    pub created_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub positions: Vec<ValidatedPosition>,
}

impl VersionDraft {
    pub fn new(
        portfolio_id: &str,
        positions: Vec<ValidatedPosition>,
        description: Option<String>,
        created_by: Option<String>,
    ) -> Result<Self> {
        if positions.is_empty() {
            return Err(ValidationError::EmptyPositions.into());
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            portfolio_id: portfolio_id.to_string(),
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            created_by,
            created_at: Utc::now().naive_utc(),
            positions,
        })
    }

    /// Numbers the draft after `latest_number` (0 when the portfolio has no
    /// versions yet) and materializes its positions.
    pub fn into_version(self, latest_number: i32) -> VersionWithPositions {
        let positions = self
            .positions
            .into_iter()
            .map(|p| Position {
                id: Uuid::new_v4().to_string(),
                portfolio_version_id: self.id.clone(),
                asset_id: p.asset.id,
                sizing: p.sizing,
                market_value: None,
                created_at: self.created_at,
                updated_at: self.created_at,
            })
            .collect();

        VersionWithPositions {
            version: PortfolioVersion {
                id: self.id,
                portfolio_id: self.portfolio_id,
                version_number: latest_number + 1,
                description: self.description,
                created_at: self.created_at,
                created_by: self.created_by,
            },
            positions,
        }
    }
}

/// Builds the version that follows `prior` (or the first version when there is none).
pub fn build_version(
    portfolio_id: &str,
    prior: Option<&PortfolioVersion>,
    positions: Vec<ValidatedPosition>,
    description: Option<String>,
    created_by: Option<String>,
) -> Result<VersionWithPositions> {
    let latest_number = prior.map(|v| v.version_number).unwrap_or(0);
    let draft = VersionDraft::new(portfolio_id, positions, description, created_by)?;
    Ok(draft.into_version(latest_number))
}
