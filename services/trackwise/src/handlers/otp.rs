use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::state::AppState;
use crate::usecase::otp::{RequestCodeUseCase, VerifyCodeUseCase};

// ── POST /api/otp/send ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendCodeRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
pub struct SendCodeResponse {
    pub success: bool,
    pub email_sent: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

pub async fn send_code(
    State(state): State<AppState>,
    Json(body): Json<SendCodeRequest>,
) -> Result<Json<SendCodeResponse>, ServiceError> {
    let usecase = RequestCodeUseCase {
        otps: state.otp_repo(),
        accounts: state.account_repo(),
        mailer: state.mailer.clone(),
        clock: state.clock(),
    };
    let issued = usecase.execute(&body.email).await?;

    let response = if issued.delivered {
        SendCodeResponse {
            success: true,
            email_sent: true,
            message: "Verification email sent successfully",
            otp: None,
        }
    } else if state.otp_fallback_in_response {
        SendCodeResponse {
            success: true,
            email_sent: false,
            message: "Email service may be unavailable - please use the code shown",
            otp: Some(issued.code),
        }
    } else {
        SendCodeResponse {
            success: true,
            email_sent: false,
            message: "We could not send the verification email. Please try again shortly.",
            otp: None,
        }
    };
    Ok(Json(response))
}

// ── POST /api/otp/verify ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub code: String,
}

#[derive(Serialize)]
pub struct VerifyCodeResponse {
    pub success: bool,
    pub message: &'static str,
}

pub async fn verify_code(
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, ServiceError> {
    let usecase = VerifyCodeUseCase {
        otps: state.otp_repo(),
        clock: state.clock(),
    };
    usecase.execute(&body.email, &body.code).await?;
    Ok(Json(VerifyCodeResponse {
        success: true,
        message: "Email verified successfully",
    }))
}
