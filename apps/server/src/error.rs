use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use riskops_core::errors::{Error as CoreError, ErrorKind};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidPositionData
        | ErrorKind::InvalidQuantity
        | ErrorKind::InvalidWeight
        | ErrorKind::EmptyPortfolioName
        | ErrorKind::EmptyPositions
        | ErrorKind::UnknownAsset
        | ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Stale | ErrorKind::InconsistentAllocation | ErrorKind::MissingBasisValue => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorKind::Database | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Core(e) => (status_for(e.kind()), e.kind().code()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorKind::InvalidInput.code()),
            ApiError::Anyhow(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::Internal.code(),
            ),
        };
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        let body = Json(ErrorBody {
            code,
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(status_for(ErrorKind::InvalidWeight), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::UnknownAsset), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorKind::MissingBasisValue),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(ErrorKind::Stale), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_for(ErrorKind::Database),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn core_errors_keep_their_code() {
        let response = ApiError::from(CoreError::not_found("Portfolio", "p1")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
