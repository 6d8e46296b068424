use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use trackwise_core::error::{FieldErrors, error_response};

/// TrackWise service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("{0}")]
    PermissionDenied(&'static str),
    #[error("not found")]
    NotFound,
    #[error("email address has not been verified")]
    VerificationRequired,
    #[error("no pending verification code for this email")]
    OtpNotFound,
    #[error("verification code has expired")]
    OtpExpired,
    #[error("verification code does not match")]
    OtpMismatch,
    #[error("report could not be generated")]
    ReportFailed(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::PermissionDenied(_) => "PERMISSION_DENIED",
            Self::NotFound => "NOT_FOUND",
            Self::VerificationRequired => "VERIFICATION_REQUIRED",
            Self::OtpNotFound => "OTP_NOT_FOUND",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::OtpMismatch => "OTP_MISMATCH",
            Self::ReportFailed(_) => "REPORT_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Single-field validation failure.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) | Self::OtpMismatch => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::NotFound | Self::OtpNotFound => StatusCode::NOT_FOUND,
            Self::VerificationRequired => StatusCode::CONFLICT,
            Self::OtpExpired => StatusCode::GONE,
            Self::ReportFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, kind = "INTERNAL", "internal error"),
            Self::ReportFailed(reason) => {
                tracing::warn!(reason = %reason, kind = "REPORT_FAILED", "report rendering failed")
            }
            _ => {}
        }
        let fields = match &self {
            Self::Validation(fields) => Some(fields),
            _ => None,
        };
        error_response(status, self.kind(), &self.to_string(), fields)
    }
}
