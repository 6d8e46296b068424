//! Session helpers for integration tests.
//!
//! Mints real signed session cookies so requests pass through the same gate
//! as production traffic.

use axum::http::{HeaderValue, header};
use uuid::Uuid;

use trackwise_auth_types::cookie::TRACKWISE_SESSION;
use trackwise_auth_types::principal::Principal;
use trackwise_auth_types::token::issue_session_token;
use trackwise_domain::role::Role;

/// Shared secret for tests that sign and validate sessions.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// A signed-in user as seen by a test client.
pub struct MockSession {
    pub user_id: Uuid,
    pub secret: String,
}

impl MockSession {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            secret: TEST_JWT_SECRET.to_owned(),
        }
    }

    /// Signed session token valid for the full session lifetime.
    pub fn token(&self) -> String {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        issue_session_token(self.user_id, &self.secret, now)
            .map(|(token, _)| token)
            .unwrap_or_else(|e| panic!("failed to sign test session: {e}"))
    }

    /// `(COOKIE, "trackwise_session=<jwt>")` pair ready to attach to a request.
    pub fn cookie_header(&self) -> (header::HeaderName, HeaderValue) {
        let value = format!("{TRACKWISE_SESSION}={}", self.token());
        let value = HeaderValue::from_str(&value)
            .unwrap_or_else(|e| panic!("invalid cookie header: {e}"));
        (header::COOKIE, value)
    }
}

/// Principal of a business owner of `company_id`.
pub fn owner_principal(company_id: Uuid) -> Principal {
    Principal {
        user_id: Uuid::new_v4(),
        profile_id: Uuid::new_v4(),
        role: Role::BusinessOwner,
        company_id: Some(company_id),
    }
}

/// Principal of a staff member of `company_id`.
pub fn staff_principal(company_id: Uuid) -> Principal {
    Principal {
        role: Role::Staff,
        ..owner_principal(company_id)
    }
}
