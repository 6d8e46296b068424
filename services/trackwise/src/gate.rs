//! Per-request session gate.
//!
//! Resolves the session cookie into a [`Principal`] and re-applies the access
//! lifecycle on every request, so a staff member deactivated mid-session is
//! signed out on their next request.

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use trackwise_auth_types::cookie::{CookieSettings, TRACKWISE_SESSION, clear_session_cookie};
use trackwise_auth_types::principal::Principal;
use trackwise_auth_types::token::validate_session_token;

use crate::domain::access::INACTIVE_ACCOUNT_MESSAGE;
use crate::domain::repository::AccessRepository;
use crate::error::ServiceError;

pub const LOGIN_PATH: &str = "/accounts/login";
pub const LOGOUT_PATH: &str = "/accounts/logout";
pub const X_TRACKWISE_NOTICE: &str = "x-trackwise-notice";

#[derive(Clone)]
pub struct GateState<A: AccessRepository + Clone> {
    pub access: A,
    pub jwt_secret: String,
    pub cookies: CookieSettings,
}

/// Outcome of checking one request's session.
#[derive(Debug)]
enum Verdict {
    Anonymous,
    StaleCookie,
    Admit(Principal),
    Deny { user_id: Uuid },
}

async fn judge<A: AccessRepository + Clone>(
    gate: &GateState<A>,
    jar: &CookieJar,
) -> Result<Verdict, ServiceError> {
    let Some(cookie) = jar.get(TRACKWISE_SESSION) else {
        return Ok(Verdict::Anonymous);
    };
    if cookie.value().is_empty() {
        return Ok(Verdict::Anonymous);
    }
    let Ok(session) = validate_session_token(cookie.value(), &gate.jwt_secret) else {
        return Ok(Verdict::StaleCookie);
    };

    // No profile: let the request through unauthenticated.
    let Some(record) = gate.access.load_access(session.user_id).await? else {
        return Ok(Verdict::Anonymous);
    };
    if record.allows_access() {
        Ok(Verdict::Admit(record.principal()))
    } else {
        Ok(Verdict::Deny {
            user_id: record.user_id,
        })
    }
}

/// axum middleware installed with `from_fn_with_state`.
pub async fn session_gate<A: AccessRepository + Clone>(
    State(gate): State<GateState<A>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let verdict = match judge(&gate, &jar).await {
        Ok(v) => v,
        Err(e) => return e.into_response(),
    };

    match verdict {
        Verdict::Anonymous => next.run(request).await,
        Verdict::StaleCookie => {
            let response = next.run(request).await;
            (clear_session_cookie(jar, &gate.cookies), response).into_response()
        }
        Verdict::Admit(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Verdict::Deny { .. } if request.uri().path() == LOGOUT_PATH => next.run(request).await,
        Verdict::Deny { user_id } => {
            tracing::info!(%user_id, path = request.uri().path(), "session revoked by access gate");
            (
                StatusCode::SEE_OTHER,
                clear_session_cookie(jar, &gate.cookies),
                [
                    (header::LOCATION, HeaderValue::from_static(LOGIN_PATH)),
                    (
                        HeaderName::from_static(X_TRACKWISE_NOTICE),
                        HeaderValue::from_static(INACTIVE_ACCOUNT_MESSAGE),
                    ),
                ],
            )
                .into_response()
        }
    }
}
