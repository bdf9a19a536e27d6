use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt::Display;

/// Errors raised by the scoring core
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// A raw ID is absent from an encoding table, or a user has no ratings
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Loaded artifacts disagree with each other (stale or corrupted pairing)
    #[error("inconsistent {table} data: {detail}")]
    DataInconsistency { table: &'static str, detail: String },

    /// Numeric failure in the scoring path, e.g. a NaN similarity
    #[error("computation error: {0}")]
    Computation(String),
}

impl RecommendError {
    pub fn not_found(entity: &'static str, id: impl Display) -> Self {
        RecommendError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds a `DataInconsistency` and logs it with the offending table
    pub fn inconsistent(table: &'static str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        tracing::error!(table, detail = %detail, "Artifact data inconsistency");
        RecommendError::DataInconsistency { table, detail }
    }
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Recommend(#[from] RecommendError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Recommend(RecommendError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Recommend(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = RecommendError::not_found("user", 11880);
        assert_eq!(err.to_string(), "user 11880 not found");
    }

    #[test]
    fn test_status_mapping() {
        let not_found: AppError = RecommendError::not_found("item", 1).into();
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let invalid = AppError::InvalidInput("top_n must be positive".to_string());
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let inconsistent: AppError = RecommendError::inconsistent("ratings", "unknown item 9").into();
        assert_eq!(
            inconsistent.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let computation: AppError = RecommendError::Computation("NaN".to_string()).into();
        assert_eq!(
            computation.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
