use trackwise_auth_types::principal::Principal;

use crate::domain::access::{INACTIVE_ACCOUNT_MESSAGE, PROFILE_MISSING_MESSAGE};
use crate::domain::password::verify_password_on_pool;
use crate::domain::repository::{AccessRepository, AccountRepository};
use crate::error::ServiceError;

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginUseCase<A: AccountRepository, X: AccessRepository> {
    pub accounts: A,
    pub access: X,
}

impl<A: AccountRepository, X: AccessRepository> LoginUseCase<A, X> {
    /// Check credentials and the access lifecycle. The caller issues the
    /// session only on `Ok`.
    pub async fn execute(&self, username: &str, password: &str) -> Result<Principal, ServiceError> {
        // 1. Credentials.
        let credentials = self
            .accounts
            .find_credentials(username.trim())
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;
        if !verify_password_on_pool(password, &credentials.password_hash).await? {
            return Err(ServiceError::InvalidCredentials);
        }

        // 2. Access lifecycle.
        let record = self
            .access
            .load_access(credentials.user_id)
            .await?
            .ok_or(ServiceError::PermissionDenied(PROFILE_MISSING_MESSAGE))?;
        if !record.allows_access() {
            tracing::info!(user_id = %record.user_id, "login refused for inactive account");
            return Err(ServiceError::PermissionDenied(INACTIVE_ACCOUNT_MESSAGE));
        }

        tracing::info!(user_id = %record.user_id, role = %record.role, "login succeeded");
        Ok(record.principal())
    }
}
