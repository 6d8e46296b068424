//! The authenticated caller, resolved once per request by the session gate.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;
use uuid::Uuid;

use trackwise_domain::role::Role;

/// Authenticated caller inserted into request extensions by the session gate.
///
/// Handlers take it as an argument instead of looking the profile up
/// themselves. Returns 401 when the gate did not admit a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub role: Role,
    /// Tenant the caller belongs to. `None` only for legacy profiles that
    /// predate company assignment.
    pub company_id: Option<Uuid>,
}

impl Principal {
    pub fn is_owner(&self) -> bool {
        self.role == Role::BusinessOwner
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // Extract synchronously and return a 'static future: axum-core 0.5 declares
    // this method as `fn -> impl Future + Send`.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let principal = parts.extensions.get::<Principal>().cloned();
        async move { principal.ok_or(StatusCode::UNAUTHORIZED) }
    }
}
