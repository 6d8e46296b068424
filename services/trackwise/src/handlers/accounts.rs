use anyhow::Context;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trackwise_auth_types::{
    cookie::{clear_session_cookie, set_session_cookie},
    principal::Principal,
    token::issue_session_token,
};
use trackwise_core::clock::Clock;
use trackwise_domain::role::Role;

use crate::domain::types::{Account, Company, CompanyChanges, ProfileChanges};
use crate::error::ServiceError;
use crate::handlers::non_blank;
use crate::state::AppState;
use crate::usecase::profile::{
    ChangePasswordUseCase, GetAccountUseCase, UpdateCompanyUseCase, UpdateProfileUseCase,
};
use crate::usecase::registration::{
    CheckAvailabilityUseCase, CompanyChoice, ListCompaniesUseCase, OwnerSignup, Registered,
    RegisterOwnerUseCase, RegisterStaffUseCase, SignupFields, StaffSignup,
};
use crate::usecase::session::LoginUseCase;

/// Sign a session for `user_id` and attach it to the jar.
fn start_session(state: &AppState, jar: CookieJar, user_id: Uuid) -> Result<CookieJar, ServiceError> {
    let now_secs = u64::try_from(state.clock().now().timestamp()).unwrap_or_default();
    let (token, _exp) =
        issue_session_token(user_id, &state.jwt_secret, now_secs).context("issue session token")?;
    Ok(set_session_cookie(jar, token, &state.cookies))
}

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RegisteredResponse {
    pub user_id: Uuid,
    pub role: Role,
    pub company_id: Uuid,
    /// `"dashboard"` when a session was started, `"login"` otherwise.
    pub next: &'static str,
}

impl RegisteredResponse {
    fn new(registered: &Registered, signed_in: bool) -> Self {
        Self {
            user_id: registered.user_id,
            role: registered.role,
            company_id: registered.company_id,
            next: if signed_in { "dashboard" } else { "login" },
        }
    }
}

#[derive(Serialize)]
pub struct CompanyResponse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub contact_info: String,
}

impl From<Company> for CompanyResponse {
    fn from(c: Company) -> Self {
        Self {
            id: c.id,
            name: c.name,
            address: c.address,
            contact_info: c.contact_info,
        }
    }
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub role: Role,
    pub phone_number: String,
    pub profile_picture_key: Option<String>,
    pub assigned_location: String,
    pub department: String,
    pub position: String,
    pub is_active: bool,
    pub notes: String,
    #[serde(serialize_with = "trackwise_core::serde::to_rfc3339_ms")]
    pub date_joined: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub profile: Option<ProfileResponse>,
    pub company: Option<CompanyResponse>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        let full_name = account.user.full_name();
        Self {
            id: account.user.id,
            username: account.user.username,
            email: account.user.email,
            first_name: account.user.first_name,
            last_name: account.user.last_name,
            full_name,
            profile: account.profile.map(|p| ProfileResponse {
                id: p.id,
                role: p.role,
                phone_number: p.phone_number,
                profile_picture_key: p.profile_picture_key,
                assigned_location: p.assigned_location,
                department: p.department,
                position: p.position,
                is_active: p.is_active,
                notes: p.notes,
                date_joined: p.date_joined,
            }),
            company: account.company.map(CompanyResponse::from),
        }
    }
}

// ── POST /accounts/register/business-owner ───────────────────────────────────

#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
}

impl From<SignupRequest> for SignupFields {
    fn from(r: SignupRequest) -> Self {
        Self {
            username: r.username,
            email: r.email,
            password: r.password,
            first_name: r.first_name,
            last_name: r.last_name,
            phone_number: r.phone_number,
        }
    }
}

#[derive(Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompanyChoiceKind {
    #[default]
    New,
    Existing,
}

#[derive(Deserialize)]
pub struct RegisterOwnerRequest {
    #[serde(flatten)]
    pub account: SignupRequest,
    #[serde(default)]
    pub company_choice: CompanyChoiceKind,
    pub new_company_name: Option<String>,
    pub new_company_address: Option<String>,
    pub new_company_contact: Option<String>,
    pub existing_company_id: Option<String>,
}

/// Blank or malformed ids count as "nothing selected".
fn selected_company(raw: Option<String>) -> Option<Uuid> {
    non_blank(raw).and_then(|id| id.parse().ok())
}

pub async fn register_business_owner(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterOwnerRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let company = match body.company_choice {
        CompanyChoiceKind::New => CompanyChoice::New {
            name: body.new_company_name.unwrap_or_default(),
            address: body.new_company_address.unwrap_or_default(),
            contact_info: body.new_company_contact.unwrap_or_default(),
        },
        CompanyChoiceKind::Existing => {
            CompanyChoice::Existing(selected_company(body.existing_company_id))
        }
    };
    let usecase = RegisterOwnerUseCase {
        accounts: state.account_repo(),
        companies: state.company_repo(),
        otps: state.otp_repo(),
        clock: state.clock(),
    };
    let registered = usecase
        .execute(OwnerSignup {
            fields: body.account.into(),
            company,
        })
        .await?;

    // A brand-new company has no one else to approve the owner: sign in now.
    let (jar, signed_in) = if registered.created_company {
        (start_session(&state, jar, registered.user_id)?, true)
    } else {
        (jar, false)
    };
    Ok((
        StatusCode::CREATED,
        jar,
        Json(RegisteredResponse::new(&registered, signed_in)),
    ))
}

// ── POST /accounts/register/staff ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterStaffRequest {
    #[serde(flatten)]
    pub account: SignupRequest,
    pub company_id: Option<String>,
}

pub async fn register_staff(
    State(state): State<AppState>,
    Json(body): Json<RegisterStaffRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let usecase = RegisterStaffUseCase {
        accounts: state.account_repo(),
        companies: state.company_repo(),
        otps: state.otp_repo(),
        clock: state.clock(),
    };
    let registered = usecase
        .execute(StaffSignup {
            fields: body.account.into(),
            company_id: selected_company(body.company_id),
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse::new(&registered, false)),
    ))
}

// ── GET /api/companies ───────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CompanyOption {
    pub id: Uuid,
    pub name: String,
}

pub async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<Vec<CompanyOption>>, ServiceError> {
    let usecase = ListCompaniesUseCase {
        companies: state.company_repo(),
    };
    let companies = usecase.execute().await?;
    Ok(Json(
        companies
            .into_iter()
            .map(|c| CompanyOption {
                id: c.id,
                name: c.name,
            })
            .collect(),
    ))
}

// ── GET /api/check-email, GET /api/check-username ────────────────────────────

#[derive(Deserialize)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct UsernameQuery {
    #[serde(default)]
    pub username: String,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub is_available: bool,
}

pub async fn check_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<AvailabilityResponse>, ServiceError> {
    let usecase = CheckAvailabilityUseCase {
        accounts: state.account_repo(),
    };
    let is_available = usecase.email_available(&query.email).await?;
    Ok(Json(AvailabilityResponse { is_available }))
}

pub async fn check_username(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<AvailabilityResponse>, ServiceError> {
    let usecase = CheckAvailabilityUseCase {
        accounts: state.account_repo(),
    };
    let is_available = usecase.username_available(&query.username).await?;
    Ok(Json(AvailabilityResponse { is_available }))
}

// ── POST /accounts/login ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let usecase = LoginUseCase {
        accounts: state.account_repo(),
        access: state.access_repo(),
    };
    let principal = usecase.execute(&body.username, &body.password).await?;
    let jar = start_session(&state, jar, principal.user_id)?;
    Ok((
        jar,
        Json(LoginResponse {
            user_id: principal.user_id,
            role: principal.role,
            company_id: principal.company_id,
        }),
    ))
}

// ── POST /accounts/logout ────────────────────────────────────────────────────

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, clear_session_cookie(jar, &state.cookies))
}

// ── GET /accounts/profile ────────────────────────────────────────────────────

pub async fn get_profile(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<AccountResponse>, ServiceError> {
    let usecase = GetAccountUseCase {
        accounts: state.account_repo(),
    };
    let account = usecase.execute(principal.user_id).await?;
    Ok(Json(account.into()))
}

// ── PUT /accounts/profile ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub assigned_location: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    pub profile_picture_key: Option<String>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<AccountResponse>, ServiceError> {
    let usecase = UpdateProfileUseCase {
        accounts: state.account_repo(),
        clock: state.clock(),
    };
    let changes = ProfileChanges {
        email: body.email,
        first_name: body.first_name.trim().to_owned(),
        last_name: body.last_name.trim().to_owned(),
        phone_number: body.phone_number.trim().to_owned(),
        assigned_location: body.assigned_location.trim().to_owned(),
        department: body.department.trim().to_owned(),
        position: body.position.trim().to_owned(),
        profile_picture_key: non_blank(body.profile_picture_key),
    };
    let account = usecase.execute(&principal, changes).await?;
    Ok(Json(account.into()))
}

// ── PUT /accounts/company ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateCompanyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub contact_info: String,
}

pub async fn update_company(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<UpdateCompanyRequest>,
) -> Result<Json<CompanyResponse>, ServiceError> {
    let usecase = UpdateCompanyUseCase {
        companies: state.company_repo(),
        clock: state.clock(),
    };
    let company = usecase
        .execute(
            &principal,
            CompanyChanges {
                name: body.name,
                address: body.address,
                contact_info: body.contact_info,
            },
        )
        .await?;
    Ok(Json(company.into()))
}

// ── POST /accounts/password ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ServiceError> {
    let usecase = ChangePasswordUseCase {
        accounts: state.account_repo(),
        clock: state.clock(),
    };
    usecase
        .execute(principal.user_id, &body.current_password, &body.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
