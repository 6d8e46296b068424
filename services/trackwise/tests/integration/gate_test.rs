use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use axum_test::TestServer;
use serde_json::json;
use uuid::Uuid;

use trackwise::domain::access::INACTIVE_ACCOUNT_MESSAGE;
use trackwise::gate::{GateState, LOGIN_PATH, X_TRACKWISE_NOTICE, session_gate};
use trackwise_auth_types::cookie::{CookieSettings, TRACKWISE_SESSION};
use trackwise_auth_types::principal::Principal;
use trackwise_domain::role::Role;
use trackwise_domain::staff::StaffStatus;
use trackwise_testing::session::{MockSession, TEST_JWT_SECRET};

use crate::helpers::{MemoryStore, seed_company, seed_staff, seed_user};

async fn whoami(principal: Principal) -> Json<serde_json::Value> {
    Json(json!({ "user_id": principal.user_id, "role": principal.role.as_str() }))
}

async fn logout() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn server(store: &MemoryStore) -> TestServer {
    let gate = GateState {
        access: store.clone(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        cookies: CookieSettings::default(),
    };
    let app = Router::new()
        .route("/whoami", get(whoami))
        .route("/accounts/logout", post(logout))
        .layer(middleware::from_fn_with_state(
            gate,
            session_gate::<MemoryStore>,
        ));
    TestServer::new(app).unwrap()
}

fn cookie_for(user_id: Uuid) -> (HeaderName, HeaderValue) {
    MockSession::new(user_id).cookie_header()
}

// ── Admission ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_admit_active_staff() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (staff, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    let (name, value) = cookie_for(staff.user_id);

    let response = server(&store).get("/whoami").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["user_id"], json!(staff.user_id));
    assert_eq!(body["role"], "staff");
}

#[tokio::test]
async fn should_admit_owner_regardless_of_active_flag() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    store.tables().profiles[0].is_active = false;
    let (name, value) = cookie_for(owner.user_id);

    let response = server(&store).get("/whoami").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn should_reject_missing_session() {
    let store = MemoryStore::new();

    let response = server(&store).get("/whoami").await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_treat_forged_cookie_as_anonymous() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let owner = seed_user(&store, company.id, Role::BusinessOwner, "maria");
    let mut session = MockSession::new(owner.user_id);
    session.secret = "some-other-secret".to_owned();
    let (name, value) = session.cookie_header();

    let response = server(&store).get("/whoami").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(cleared.starts_with(&format!("{TRACKWISE_SESSION}=")), "got {cleared}");
}

// ── Revocation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sign_out_staff_deactivated_mid_session() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (staff, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    let server = server(&store);
    let (name, value) = cookie_for(staff.user_id);

    let first = server
        .get("/whoami")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);

    store.tables().staff[0].details.status = StaffStatus::OnLeave;
    let second = server.get("/whoami").add_header(name, value).await;

    assert_eq!(second.status_code(), StatusCode::SEE_OTHER);
    let headers = second.headers();
    assert_eq!(headers.get(header::LOCATION).unwrap(), LOGIN_PATH);
    assert_eq!(
        headers.get(X_TRACKWISE_NOTICE).unwrap(),
        INACTIVE_ACCOUNT_MESSAGE
    );
    assert!(headers.get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn should_deny_staff_with_inactive_profile() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (staff, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Active);
    store.tables().profiles[0].is_active = false;
    let (name, value) = cookie_for(staff.user_id);

    let response = server(&store).get("/whoami").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn should_let_revoked_session_reach_logout() {
    let store = MemoryStore::new();
    let company = seed_company(&store, "Acme");
    let (staff, _) = seed_staff(&store, company.id, "juan", "EMP-1", StaffStatus::Inactive);
    let (name, value) = cookie_for(staff.user_id);

    let response = server(&store)
        .post("/accounts/logout")
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn should_pass_through_session_without_profile() {
    let store = MemoryStore::new();
    let (name, value) = cookie_for(Uuid::now_v7());

    let response = server(&store).get("/whoami").add_header(name, value).await;

    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
