use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use shop_types::domain::DomainError;
use shop_types::ports::RepoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_)
            | AppError::InsufficientStock(_)
            | AppError::InvalidTransition(_)
            | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidArgument(m) => AppError::BadRequest(m),
            DomainError::NotFound(_) => AppError::NotFound(e.to_string()),
            DomainError::InsufficientStock { .. } => AppError::InsufficientStock(e.to_string()),
            DomainError::InvalidTransition { .. } => AppError::InvalidTransition(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::InsufficientStock(id) => {
                AppError::InsufficientStock(format!("not enough stock for product {id}"))
            }
            RepoError::ProductNotFound(id) => AppError::NotFound(format!("product {id}")),
            RepoError::StatusChanged { .. } => AppError::InvalidTransition(e.to_string()),
            RepoError::Conflict(m) => AppError::Conflict(m),
            RepoError::DbError(m) => AppError::Internal(anyhow::anyhow!(m)),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status();
        let msg = match &self {
            AppError::BadRequest(m)
            | AppError::Unauthenticated(m)
            | AppError::NotFound(m)
            | AppError::InsufficientStock(m)
            | AppError::InvalidTransition(m)
            | AppError::Conflict(m) => m.clone(),
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "request failed");
                "internal error".into()
            }
        };

        let body = serde_json::to_string(&ErrorBody { error: msg })
            .unwrap_or_else(|_| "{\"error\":\"internal serialization\"}".into());
        (code, [("content-type", "application/json")], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_types::domain::order::OrderStatus;
    use uuid::Uuid;

    #[test]
    fn domain_errors_map_to_status_codes() {
        let cases = [
            (DomainError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::NotFound("product".into()), StatusCode::NOT_FOUND),
            (
                DomainError::InsufficientStock {
                    product_id: Uuid::new_v4(),
                    name: "Shirt".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::InvalidTransition {
                    from: OrderStatus::Paid,
                    to: OrderStatus::Cancelled,
                },
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (err, code) in cases {
            assert_eq!(AppError::from(err).status(), code);
        }
    }

    #[test]
    fn repo_errors_map_to_app_errors() {
        assert!(matches!(
            AppError::from(RepoError::DbError("boom".into())),
            AppError::Internal(_)
        ));
        assert!(matches!(
            AppError::from(RepoError::Conflict("dup".into())),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(RepoError::InsufficientStock(Uuid::new_v4())),
            AppError::InsufficientStock(_)
        ));
        assert!(matches!(
            AppError::from(RepoError::ProductNotFound(Uuid::new_v4())),
            AppError::NotFound(_)
        ));
        let stale = AppError::from(RepoError::StatusChanged {
            id: Uuid::new_v4(),
            current: OrderStatus::Paid,
        });
        assert!(matches!(stale, AppError::InvalidTransition(_)));
        assert_eq!(stale.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_error_hides_details() {
        let resp = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let resp = AppError::Unauthenticated("sign in".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn insufficient_stock_message_names_product() {
        let err = AppError::from(DomainError::InsufficientStock {
            product_id: Uuid::new_v4(),
            name: "Silk Scarf".into(),
        });
        assert_eq!(err.to_string(), "Insufficient stock: not enough stock for Silk Scarf");
    }
}
