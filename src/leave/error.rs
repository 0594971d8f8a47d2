use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Reasons a candidate request is refused at creation time.
/// Surfaced verbatim to the caller; nothing is persisted on failure.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("date range invalid")]
    InvalidRange,
    #[error("past date")]
    PastDate,
    #[error("duplicate")]
    Duplicate,
    #[error("overlap")]
    Overlap,
    #[error("pending lock")]
    PendingLock,
    #[error("insufficient balance")]
    InsufficientBalance,
}

#[derive(Debug, Error)]
pub enum LeaveError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("forbidden: not a reviewer")]
    NotAReviewer,

    #[error("forbidden: self-approval")]
    SelfApproval,

    #[error("forbidden: insufficient role")]
    RoleScope,

    #[error("leave request not found")]
    NotFound,

    #[error("leave request already decided")]
    AlreadyDecided,

    #[error("invalid decision value")]
    InvalidDecision,

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl actix_web::ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_) | LeaveError::InvalidDecision => StatusCode::BAD_REQUEST,
            LeaveError::NotAReviewer | LeaveError::SelfApproval | LeaveError::RoleScope => {
                StatusCode::FORBIDDEN
            }
            LeaveError::NotFound => StatusCode::NOT_FOUND,
            LeaveError::AlreadyDecided => StatusCode::CONFLICT,
            LeaveError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            LeaveError::Database(e) => {
                tracing::error!(error = %e, "Database error in leave workflow");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
