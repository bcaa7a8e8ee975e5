use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    /// Requester is neither the owner nor an admin
    #[error("User {requester} may not view order {order}")]
    Forbidden { order: Uuid, requester: Uuid },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(_) => AppError::NotFound("Order not found".to_string()),
            OrderError::Forbidden { .. } => {
                AppError::Forbidden("Not authorized to view this order".to_string())
            }
            OrderError::Validation(msg) => AppError::BadRequest(msg),
            OrderError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for OrderError {
    fn from(err: mongodb::error::Error) -> Self {
        OrderError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_forbidden_maps_to_403_with_fixed_message() {
        let err = OrderError::Forbidden {
            order: Uuid::now_v7(),
            requester: Uuid::now_v7(),
        };
        let app: AppError = err.into();
        assert_eq!(app.status(), StatusCode::FORBIDDEN);
        assert_eq!(app.to_string(), "Forbidden: Not authorized to view this order");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let app: AppError = OrderError::NotFound(Uuid::now_v7()).into();
        assert_eq!(app.status(), StatusCode::NOT_FOUND);
    }
}
