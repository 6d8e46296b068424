use rand::RngExt;
use uuid::Uuid;

use trackwise_core::clock::Clock;

use crate::domain::repository::{AccountRepository, EmailSender, OtpRepository};
use crate::domain::types::{
    OTP_LEN, OTP_TTL_SECS, OtpRecord, OutgoingEmail, is_plausible_email, normalize_email,
};
use crate::error::ServiceError;

pub const VERIFICATION_SUBJECT: &str = "Your TrackWise Verification Code";

/// Six random decimal digits; leading zeros allowed.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..OTP_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

pub fn verification_email(to: &str, code: &str) -> OutgoingEmail {
    let minutes = OTP_TTL_SECS / 60;
    OutgoingEmail {
        to: to.to_owned(),
        subject: VERIFICATION_SUBJECT.to_owned(),
        text_body: format!(
            "Your TrackWise verification code is: {code}\n\n\
             This code expires in {minutes} minutes.\n\
             If you did not request this code, you can ignore this email.\n"
        ),
        html_body: format!(
            "<html><body style=\"font-family: Arial, sans-serif;\">\
             <h2>TrackWise Email Verification</h2>\
             <p>Your verification code is:</p>\
             <p style=\"font-size: 28px; font-weight: bold; letter-spacing: 6px;\">{code}</p>\
             <p>This code expires in {minutes} minutes.</p>\
             <p style=\"color: #777;\">If you did not request this code, you can ignore this email.</p>\
             </body></html>"
        ),
    }
}

// ── RequestCode ──────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CodeIssued {
    pub email: String,
    pub code: String,
    /// `false` when the mail transport failed; the code is still valid.
    pub delivered: bool,
}

pub struct RequestCodeUseCase<O, A, M, C>
where
    O: OtpRepository,
    A: AccountRepository,
    M: EmailSender,
    C: Clock,
{
    pub otps: O,
    pub accounts: A,
    pub mailer: M,
    pub clock: C,
}

impl<O, A, M, C> RequestCodeUseCase<O, A, M, C>
where
    O: OtpRepository,
    A: AccountRepository,
    M: EmailSender,
    C: Clock,
{
    pub async fn execute(&self, raw_email: &str) -> Result<CodeIssued, ServiceError> {
        // 1. Normalize and shape-check.
        let email = normalize_email(raw_email);
        if !is_plausible_email(&email) {
            return Err(ServiceError::field(
                "email",
                "Please enter a valid email address.",
            ));
        }

        // 2. Registered addresses cannot be re-verified.
        if self.accounts.email_taken(&email, None).await? {
            return Err(ServiceError::field("email", "This email is already registered"));
        }

        // 3. Supersede every previous code for this address.
        let record = OtpRecord {
            id: Uuid::now_v7(),
            email: email.clone(),
            code: generate_code(),
            created_at: self.clock.now(),
            is_used: false,
        };
        self.otps.replace_for_email(&record).await?;

        // 4. Deliver; failure is reported, never fatal.
        let delivered = match self
            .mailer
            .send(&verification_email(&email, &record.code))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(email = %email, error = %e, "verification email delivery failed");
                false
            }
        };

        Ok(CodeIssued {
            email,
            code: record.code,
            delivered,
        })
    }
}

// ── VerifyCode ───────────────────────────────────────────────────────────────

pub struct VerifyCodeUseCase<O: OtpRepository, C: Clock> {
    pub otps: O,
    pub clock: C,
}

impl<O: OtpRepository, C: Clock> VerifyCodeUseCase<O, C> {
    pub async fn execute(&self, raw_email: &str, code: &str) -> Result<(), ServiceError> {
        let email = normalize_email(raw_email);
        let code = code.trim();
        if email.is_empty() || code.is_empty() {
            return Err(ServiceError::field(
                "otp",
                "Email and verification code are required.",
            ));
        }

        // 1. Only the newest unused code is authoritative.
        let record = self
            .otps
            .latest_unused(&email)
            .await?
            .ok_or(ServiceError::OtpNotFound)?;

        // 2. Expired codes are removed on sight.
        if record.is_expired_at(self.clock.now()) {
            self.otps.delete(record.id).await?;
            return Err(ServiceError::OtpExpired);
        }

        // 3. Compare.
        if record.code != code {
            return Err(ServiceError::OtpMismatch);
        }

        // 4. Consume, dropping any other pending codes.
        self.otps.mark_used(record.id, &email).await?;
        tracing::info!(email = %email, "email address verified");
        Ok(())
    }
}
