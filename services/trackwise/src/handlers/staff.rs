use axum::{
    Json,
    extract::{Path, RawQuery, State},
    http::StatusCode,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trackwise_auth_types::principal::Principal;
use trackwise_domain::staff::StaffStatus;

use crate::domain::types::{StaffChanges, StaffDetails, StaffFilter, StaffMember};
use crate::error::ServiceError;
use crate::handlers::accounts::SignupRequest;
use crate::handlers::{non_blank, parse_choice, parse_query};
use crate::state::AppState;
use crate::usecase::staff::{
    CreateStaffUseCase, DeleteStaffUseCase, GetStaffUseCase, ListStaffUseCase, NewStaffInput,
    ToggleStaffStatusUseCase, UpdateStaffUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StaffResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub employee_id: String,
    pub position: String,
    pub department: String,
    pub hire_date: NaiveDate,
    pub salary: Option<Decimal>,
    pub status: StaffStatus,
    pub status_label: &'static str,
    pub assigned_locations: Vec<String>,
    pub permissions: serde_json::Value,
    pub notes: String,
    #[serde(serialize_with = "trackwise_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "trackwise_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<StaffMember> for StaffResponse {
    fn from(m: StaffMember) -> Self {
        let full_name = m.full_name();
        Self {
            id: m.id,
            user_id: m.user_id,
            username: m.username,
            full_name,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            phone_number: m.phone_number,
            status_label: m.details.status.label(),
            employee_id: m.details.employee_id,
            position: m.details.position,
            department: m.details.department,
            hire_date: m.details.hire_date,
            salary: m.details.salary,
            status: m.details.status,
            assigned_locations: m.details.assigned_locations,
            permissions: m.details.permissions,
            notes: m.details.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

// ── GET /staff ───────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct StaffQuery {
    pub search: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct StaffListResponse {
    pub members: Vec<StaffResponse>,
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub on_leave: u64,
}

pub async fn list_staff(
    State(state): State<AppState>,
    principal: Principal,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<StaffListResponse>, ServiceError> {
    let query: StaffQuery = parse_query(raw_query)?;
    let filter = StaffFilter {
        search: non_blank(query.search),
        department: non_blank(query.department),
        status: parse_choice(query.status, "status")?,
    };
    let usecase = ListStaffUseCase {
        staff: state.staff_repo(),
    };
    let listing = usecase.execute(&principal, filter).await?;
    Ok(Json(StaffListResponse {
        members: listing.members.into_iter().map(StaffResponse::from).collect(),
        total: listing.counts.total,
        active: listing.counts.active,
        inactive: listing.counts.inactive,
        on_leave: listing.counts.on_leave,
    }))
}

// ── POST /staff ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StaffDetailsRequest {
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub department: String,
    pub hire_date: NaiveDate,
    pub salary: Option<Decimal>,
    #[serde(default)]
    pub status: StaffStatus,
    #[serde(default)]
    pub assigned_locations: Vec<String>,
    #[serde(default)]
    pub permissions: serde_json::Value,
    #[serde(default)]
    pub notes: String,
}

impl From<StaffDetailsRequest> for StaffDetails {
    fn from(r: StaffDetailsRequest) -> Self {
        Self {
            employee_id: r.employee_id,
            position: r.position,
            department: r.department,
            hire_date: r.hire_date,
            salary: r.salary,
            status: r.status,
            assigned_locations: r.assigned_locations,
            permissions: match r.permissions {
                serde_json::Value::Null => serde_json::json!({}),
                other => other,
            },
            notes: r.notes.trim().to_owned(),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateStaffRequest {
    #[serde(flatten)]
    pub account: SignupRequest,
    #[serde(flatten)]
    pub details: StaffDetailsRequest,
}

pub async fn create_staff(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<CreateStaffRequest>,
) -> Result<(StatusCode, Json<StaffResponse>), ServiceError> {
    let usecase = CreateStaffUseCase {
        staff: state.staff_repo(),
        accounts: state.account_repo(),
        clock: state.clock(),
    };
    let member = usecase
        .execute(
            &principal,
            NewStaffInput {
                account: body.account.into(),
                details: body.details.into(),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

// ── GET /staff/{id} ──────────────────────────────────────────────────────────

pub async fn get_staff(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<StaffResponse>, ServiceError> {
    let usecase = GetStaffUseCase {
        staff: state.staff_repo(),
    };
    let member = usecase.execute(&principal, id).await?;
    Ok(Json(member.into()))
}

// ── PUT /staff/{id} ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateStaffRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(flatten)]
    pub details: StaffDetailsRequest,
}

pub async fn update_staff(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStaffRequest>,
) -> Result<Json<StaffResponse>, ServiceError> {
    let usecase = UpdateStaffUseCase {
        staff: state.staff_repo(),
        accounts: state.account_repo(),
        clock: state.clock(),
    };
    let changes = StaffChanges {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        phone_number: body.phone_number,
        details: body.details.into(),
    };
    let member = usecase.execute(&principal, id, changes).await?;
    Ok(Json(member.into()))
}

// ── DELETE /staff/{id} ───────────────────────────────────────────────────────

pub async fn delete_staff(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    let usecase = DeleteStaffUseCase {
        staff: state.staff_repo(),
    };
    usecase.execute(&principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /staff/{id}/toggle-status ───────────────────────────────────────────

#[derive(Serialize)]
pub struct ToggleStatusResponse {
    pub success: bool,
    pub new_status: StaffStatus,
    pub status_label: &'static str,
    pub action: &'static str,
}

pub async fn toggle_staff_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<ToggleStatusResponse>, ServiceError> {
    let usecase = ToggleStaffStatusUseCase {
        staff: state.staff_repo(),
        clock: state.clock(),
    };
    let toggle = usecase.execute(&principal, id).await?;
    Ok(Json(ToggleStatusResponse {
        success: true,
        new_status: toggle.new_status,
        status_label: toggle.new_status.label(),
        action: if toggle.activated {
            "activated"
        } else {
            "deactivated"
        },
    }))
}
